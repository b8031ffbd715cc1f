//! Transformer-based sentiment backend: a BERT encoder with a binary
//! classification head, loaded from local safetensors and shared through
//! process-wide statics after first initialization.

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{
    BertModel, Config as BertConfig, HiddenAct, PositionEmbeddingType,
};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tokenizers::Tokenizer;
use tokio::fs;
use tracing::info;

use super::types::{SentimentLabel, SentimentResult};
use crate::TARGET_SENTIMENT;

pub const MODEL_URL: &str =
    "https://huggingface.co/textattack/bert-base-uncased-SST-2/resolve/main/model.safetensors";
pub const TOKENIZER_URL: &str =
    "https://huggingface.co/bert-base-uncased/resolve/main/tokenizer.json";

// Encoder, classification head, and tokenizer; read-only once set.
static MODEL: OnceLock<Arc<BertModel>> = OnceLock::new();
static CLASSIFIER: OnceLock<Arc<Linear>> = OnceLock::new();
static TOKENIZER: OnceLock<Arc<Tokenizer>> = OnceLock::new();

/// Configuration for the neural sentiment classifier.
#[derive(Debug, Clone)]
pub struct NeuralConfig {
    pub model_path: String,
    pub tokenizer_path: String,
    pub hidden_size: usize,
    pub max_length: usize,
    /// When false, missing model files fail initialization instead of
    /// triggering a download, which sends construction down the fallback
    /// chain.
    pub download_missing: bool,
    pub device: Device,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            model_path: "models/sentiment-bert.safetensors".to_string(),
            tokenizer_path: "models/sentiment-tokenizer.json".to_string(),
            hidden_size: 768,
            max_length: 512,
            download_missing: true,
            device: Device::Cpu,
        }
    }
}

impl NeuralConfig {
    pub async fn ensure_models_exist(&self) -> Result<()> {
        let missing_model = !Path::new(&self.model_path).exists();
        let missing_tokenizer = !Path::new(&self.tokenizer_path).exists();

        if (missing_model || missing_tokenizer) && !self.download_missing {
            return Err(anyhow!("model files missing and downloads disabled"));
        }

        if !Path::new("models").exists() {
            fs::create_dir("models").await?;
        }

        if missing_model {
            info!(target: TARGET_SENTIMENT, "Downloading sentiment model from {}", MODEL_URL);
            let response = reqwest::get(MODEL_URL).await?;
            let bytes = response.bytes().await?;
            fs::write(&self.model_path, bytes).await?;
            info!(target: TARGET_SENTIMENT, "Downloaded sentiment model to {}", self.model_path);
        }

        if missing_tokenizer {
            info!(target: TARGET_SENTIMENT, "Downloading sentiment tokenizer from {}", TOKENIZER_URL);
            let response = reqwest::get(TOKENIZER_URL).await?;
            let bytes = response.bytes().await?;
            fs::write(&self.tokenizer_path, bytes).await?;
            info!(target: TARGET_SENTIMENT, "Downloaded sentiment tokenizer to {}", self.tokenizer_path);
        }

        Ok(())
    }

    fn bert_config(&self) -> BertConfig {
        BertConfig {
            hidden_size: self.hidden_size,
            intermediate_size: 3072,
            max_position_embeddings: self.max_length,
            num_attention_heads: 12,
            num_hidden_layers: 12,
            vocab_size: 30522,
            layer_norm_eps: 1e-12,
            pad_token_id: 0,
            hidden_act: HiddenAct::Gelu,
            hidden_dropout_prob: 0.0,
            type_vocab_size: 2,
            initializer_range: 0.02,
            position_embedding_type: PositionEmbeddingType::Absolute,
            use_cache: false,
            classifier_dropout: None,
            model_type: None,
        }
    }
}

/// Loads the encoder and classification head into the statics.
fn init_weights(config: &NeuralConfig) -> Result<()> {
    if MODEL.get().is_some() && CLASSIFIER.get().is_some() {
        return Ok(());
    }

    let tensors = candle_core::safetensors::load_buffer(
        &std::fs::read(&config.model_path)?,
        &config.device,
    )
    .map_err(|e| anyhow!("failed to load model tensors: {}", e))?;
    let vb = VarBuilder::from_tensors(tensors, DType::F32, &config.device);

    let model = BertModel::load(vb.pp("bert"), &config.bert_config())
        .map_err(|e| anyhow!("failed to load BERT encoder: {}", e))?;
    let classifier = candle_nn::linear(config.hidden_size, 2, vb.pp("classifier"))
        .map_err(|e| anyhow!("failed to load classification head: {}", e))?;

    let _ = MODEL.set(Arc::new(model));
    let _ = CLASSIFIER.set(Arc::new(classifier));
    info!(target: TARGET_SENTIMENT, "Loaded neural sentiment model from {}", config.model_path);
    Ok(())
}

fn init_tokenizer(config: &NeuralConfig) -> Result<()> {
    if TOKENIZER.get().is_some() {
        return Ok(());
    }
    let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
        .map_err(|e| anyhow!("failed to load tokenizer: {}", e))?;
    let _ = TOKENIZER.set(Arc::new(tokenizer));
    info!(target: TARGET_SENTIMENT, "Loaded sentiment tokenizer from {}", config.tokenizer_path);
    Ok(())
}

pub struct NeuralClassifier {
    config: NeuralConfig,
}

impl NeuralClassifier {
    /// Provisions and loads the model. Any failure here is expected to be
    /// handled by the caller's fallback chain.
    pub async fn init(config: NeuralConfig) -> Result<Self> {
        config.ensure_models_exist().await?;
        init_weights(&config)?;
        init_tokenizer(&config)?;
        Ok(Self { config })
    }

    pub fn analyze(&self, text: &str) -> Result<SentimentResult> {
        let model = MODEL
            .get()
            .ok_or_else(|| anyhow!("model not initialized"))?;
        let classifier = CLASSIFIER
            .get()
            .ok_or_else(|| anyhow!("classifier not initialized"))?;
        let tokenizer = TOKENIZER
            .get()
            .ok_or_else(|| anyhow!("tokenizer not initialized"))?;

        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenization failed: {}", e))?;

        let max_len = self.config.max_length - 1;
        let input_ids: Vec<i64> = encoding
            .get_ids()
            .iter()
            .take(max_len)
            .map(|&x| x as i64)
            .collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .take(max_len)
            .map(|&x| x as i64)
            .collect();

        let input_ids = Tensor::new(input_ids, &self.config.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(attention_mask, &self.config.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_state = model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Masked mean pooling over the sequence dimension.
        let mask_float = attention_mask.to_dtype(DType::F32)?;
        let mask_expanded = mask_float.unsqueeze(2)?.expand(hidden_state.shape())?;
        let summed = hidden_state.mul(&mask_expanded)?.sum(1)?;
        let counts = mask_float.sum(1)?.unsqueeze(1)?.clamp(1.0, f32::MAX)?;
        let pooled = summed.div(&counts.expand(summed.shape())?)?;

        let logits = classifier.forward(&pooled)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        if probs.len() != 2 {
            return Err(anyhow!("unexpected class count: {}", probs.len()));
        }

        let negative = probs[0] as f64;
        let positive = probs[1] as f64;
        let (label, polarity, confidence) = if positive >= negative {
            (SentimentLabel::Positive, positive, positive)
        } else {
            (SentimentLabel::Negative, -negative, negative)
        };

        Ok(SentimentResult {
            polarity,
            subjectivity: polarity.abs(),
            label,
            confidence,
        })
    }
}
