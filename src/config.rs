use serde::Deserialize;

/// Library configuration, deserialized from whatever config source the
/// host application uses. Every field has a default, so an empty config
/// section is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_match_threshold")]
    match_threshold: f32,
    #[serde(default = "default_receipt_tag_bytes")]
    receipt_tag_bytes: usize,
}

impl Config {
    /// Maximum embedding distance at which two samples count as the same
    /// face. This is the host's policy knob, not ours: lower values reject
    /// genuine matches, higher values admit impostors. The pipeline never
    /// applies a threshold on its own.
    pub fn match_threshold(&self) -> f32 {
        self.match_threshold
    }

    /// How many bytes of the identity hash appear on a receipt's visible
    /// tag. Wider tags collide less often across receipts but are harder
    /// to read out over a desk.
    pub fn receipt_tag_bytes(&self) -> usize {
        self.receipt_tag_bytes
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            receipt_tag_bytes: default_receipt_tag_bytes(),
        }
    }
}

fn default_match_threshold() -> f32 {
    0.6
}

fn default_receipt_tag_bytes() -> usize {
    4
}
