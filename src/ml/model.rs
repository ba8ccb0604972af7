use burn::{
    nn::{
        gru::{Gru, GruConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::domain::rnn_mode::RnnMode;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally - do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RnnLmConfig {
    /// Vocabulary size, also the number of output logits
    pub ntokens: usize,
    /// Embedding width
    pub emsize:  usize,
    /// Recurrent hidden width
    pub nhid:    usize,
    pub mode:    RnnMode,
    pub dropout: f64,
}

impl RnnLmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnLm<B> {
        let embedding = EmbeddingConfig::new(self.ntokens, self.emsize).init(device);

        let (lstm, gru, elman) = match self.mode {
            RnnMode::Lstm => (
                Some(LstmConfig::new(self.emsize, self.nhid, true).init(device)),
                None,
                None,
            ),
            RnnMode::Gru => (
                None,
                Some(GruConfig::new(self.emsize, self.nhid, true).init(device)),
                None,
            ),
            RnnMode::RnnRelu | RnnMode::RnnTanh => (
                None,
                None,
                Some(
                    ElmanRnnConfig::new(self.emsize, self.nhid, self.mode == RnnMode::RnnRelu)
                        .init(device),
                ),
            ),
        };

        let decoder = LinearConfig::new(self.nhid, self.ntokens).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        RnnLm { embedding, lstm, gru, elman, dropout, decoder, ntokens: self.ntokens }
    }
}

// ─── Elman RNN ────────────────────────────────────────────────────────────────
// h_t = act(W_ih x_t + b_ih + W_hh h_{t-1}),  act = relu | tanh
#[derive(Config, Debug)]
pub struct ElmanRnnConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    pub use_relu: bool,
}

impl ElmanRnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ElmanRnn<B> {
        ElmanRnn {
            input_to_hidden:  LinearConfig::new(self.d_input, self.d_hidden).init(device),
            hidden_to_hidden: LinearConfig::new(self.d_hidden, self.d_hidden)
                .with_bias(false)
                .init(device),
            use_relu: self.use_relu,
            d_hidden: self.d_hidden,
        }
    }
}

#[derive(Module, Debug)]
pub struct ElmanRnn<B: Backend> {
    pub input_to_hidden:  Linear<B>,
    pub hidden_to_hidden: Linear<B>,
    pub use_relu:         bool,
    pub d_hidden:         usize,
}

impl<B: Backend> ElmanRnn<B> {
    /// x: [batch, seq_len, d_input] → [batch, seq_len, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, seq_len, d_input] = x.dims();
        let mut h = Tensor::<B, 2>::zeros([batch, self.d_hidden], &x.device());
        let mut outputs = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let x_t = x
                .clone()
                .slice([0..batch, t..t + 1, 0..d_input])
                .reshape([batch, d_input]);
            let pre = self.input_to_hidden.forward(x_t) + self.hidden_to_hidden.forward(h);
            h = if self.use_relu {
                activation::relu(pre)
            } else {
                activation::tanh(pre)
            };
            outputs.push(h.clone().unsqueeze_dim::<3>(1));
        }

        Tensor::cat(outputs, 1)
    }
}

// ─── Language model ───────────────────────────────────────────────────────────
// Exactly one of lstm / gru / elman is Some, chosen by RnnMode.
#[derive(Module, Debug)]
pub struct RnnLm<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Option<Lstm<B>>,
    pub gru:       Option<Gru<B>>,
    pub elman:     Option<ElmanRnn<B>>,
    pub dropout:   Dropout,
    pub decoder:   Linear<B>,
    pub ntokens:   usize,
}

impl<B: Backend> RnnLm<B> {
    /// inputs: [batch, seq_len] → outputs: [batch, seq_len, ntokens]
    ///
    /// The dense projection is tanh-activated before the
    /// cross-entropy, as in the tutorial this model reproduces.
    pub fn forward(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let emb    = self.dropout.forward(self.embedding.forward(inputs));
        let hidden = self.dropout.forward(self.recurrent(emb));
        activation::tanh(self.decoder.forward(hidden))
    }

    fn recurrent(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        match (&self.lstm, &self.gru, &self.elman) {
            (Some(lstm), _, _) => lstm.forward(x, None).0,
            (_, Some(gru), _) => gru.forward(x, None),
            (_, _, Some(elman)) => elman.forward(x),
            _ => unreachable!("RnnLm is always built with one recurrent layer"),
        }
    }

    /// Mean cross-entropy of next-token prediction over every
    /// position in the window.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let [batch, seq_len] = targets.dims();
        let outputs = self.forward(inputs).reshape([batch * seq_len, self.ntokens]);
        let targets = targets.reshape([batch * seq_len]);
        CrossEntropyLossConfig::new()
            .init(&outputs.device())
            .forward(outputs, targets)
    }
}
