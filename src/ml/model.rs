use burn::{
    nn::{
        Dropout, DropoutConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SequenceClassifierConfig {
    /// Flattened feature width D = landmarks × 3
    pub feature_width: usize,
    /// Output width C — one logit per registered gesture
    pub num_classes: usize,
    #[config(default = 128)]
    pub rnn1_hidden: usize,
    #[config(default = 64)]
    pub rnn2_hidden: usize,
    #[config(default = 64)]
    pub dense_width: usize,
    #[config(default = 0.3)]
    pub rnn_dropout: f64,
    #[config(default = 0.2)]
    pub dense_dropout: f64,
}

impl SequenceClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceClassifier<B> {
        SequenceClassifier {
            lstm1:    LstmConfig::new(self.feature_width, self.rnn1_hidden, true).init(device),
            norm1:    LayerNormConfig::new(self.rnn1_hidden).init(device),
            dropout1: DropoutConfig::new(self.rnn_dropout).init(),
            lstm2:    LstmConfig::new(self.rnn1_hidden, self.rnn2_hidden, true).init(device),
            norm2:    LayerNormConfig::new(self.rnn2_hidden).init(device),
            dropout2: DropoutConfig::new(self.rnn_dropout).init(),
            dense:    LinearConfig::new(self.rnn2_hidden, self.dense_width).init(device),
            dropout3: DropoutConfig::new(self.dense_dropout).init(),
            output:   LinearConfig::new(self.dense_width, self.num_classes).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    pub lstm1:    Lstm<B>,
    pub norm1:    LayerNorm<B>,
    pub dropout1: Dropout,
    pub lstm2:    Lstm<B>,
    pub norm2:    LayerNorm<B>,
    pub dropout2: Dropout,
    pub dense:    Linear<B>,
    pub dropout3: Dropout,
    pub output:   Linear<B>,
}

impl<B: Backend> SequenceClassifier<B> {
    /// sequences: [batch, T, D] → class logits: [batch, C]
    pub fn forward(&self, sequences: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = sequences.dims();

        // First recurrent layer emits the full hidden sequence
        let (x, _) = self.lstm1.forward(sequences, None);
        let x = self.dropout1.forward(self.norm1.forward(x));

        // Second recurrent layer — only its final timestep feeds
        // the classification head
        let (x, _) = self.lstm2.forward(x, None);
        let [_, _, hidden] = x.dims();
        let x = x
            .slice([0..batch_size, seq_len - 1..seq_len, 0..hidden])
            .reshape([batch_size, hidden]);
        let x = self.dropout2.forward(self.norm2.forward(x));

        let x = burn::tensor::activation::relu(self.dense.forward(x));
        let x = self.dropout3.forward(x);

        self.output.forward(x)
    }

    pub fn forward_classification(
        &self,
        sequences: Tensor<B, 3>,
        labels:    Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(sequences);
        let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
        // Cross-entropy applies the softmax internally, so the
        // model emits raw logits
        let loss = ce.forward(logits.clone(), labels);
        (loss, logits)
    }
}
