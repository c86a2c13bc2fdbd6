use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub bot_detection: BotDetectionConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> String {
    "user-wallet-transactions.json".to_string()
}

// ============================================================
// Scoring Config
// ============================================================

/// Weights, saturation caps and penalties for the scoring formula.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    #[serde(default = "default_activity_cap")]
    pub activity_cap: u64,
    #[serde(default = "default_diversity_cap")]
    pub diversity_cap: u64,
    #[serde(default = "default_age_cap_days")]
    pub age_cap_days: f64,
    #[serde(default = "default_liquidation_penalty")]
    pub liquidation_penalty: f64,
    #[serde(default = "default_bot_penalty")]
    pub bot_penalty: f64,
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            activity_cap: default_activity_cap(),
            diversity_cap: default_diversity_cap(),
            age_cap_days: default_age_cap_days(),
            liquidation_penalty: default_liquidation_penalty(),
            bot_penalty: default_bot_penalty(),
            weights: ScoringWeights::default(),
        }
    }
}

fn default_activity_cap() -> u64 {
    15
}

fn default_diversity_cap() -> u64 {
    5
}

fn default_age_cap_days() -> f64 {
    180.0
}

fn default_liquidation_penalty() -> f64 {
    100.0
}

fn default_bot_penalty() -> f64 {
    150.0
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringWeights {
    #[serde(default = "default_weight_activity")]
    pub activity: f64,
    #[serde(default = "default_weight_diversity")]
    pub diversity: f64,
    #[serde(default = "default_weight_deposit")]
    pub deposit: f64,
    #[serde(default = "default_weight_longevity")]
    pub longevity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            activity: default_weight_activity(),
            diversity: default_weight_diversity(),
            deposit: default_weight_deposit(),
            longevity: default_weight_longevity(),
        }
    }
}

fn default_weight_activity() -> f64 {
    0.25
}

fn default_weight_diversity() -> f64 {
    0.20
}

fn default_weight_deposit() -> f64 {
    0.35
}

fn default_weight_longevity() -> f64 {
    0.20
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.activity + self.diversity + self.deposit + self.longevity
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> eyre::Result<()> {
        let w = &self.weights;
        if [w.activity, w.diversity, w.deposit, w.longevity]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(eyre::eyre!("Scoring weights must be non-negative numbers"));
        }
        let total = w.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(eyre::eyre!("Scoring weights must sum to 1.0, got {}", total));
        }
        if self.activity_cap == 0 || self.diversity_cap == 0 {
            return Err(eyre::eyre!(
                "activity_cap and diversity_cap must be greater than zero"
            ));
        }
        if !(self.age_cap_days > 0.0) {
            return Err(eyre::eyre!(
                "age_cap_days must be greater than zero, got {}",
                self.age_cap_days
            ));
        }
        if !(self.liquidation_penalty >= 0.0) || !(self.bot_penalty >= 0.0) {
            return Err(eyre::eyre!("Penalties must be non-negative"));
        }
        Ok(())
    }
}

// ============================================================
// Bot Detection Config
// ============================================================

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BotDetectionConfig {
    /// A wallet must have strictly more transactions than this to be flagged.
    #[serde(default = "default_bot_min_transactions")]
    pub min_transactions: u64,
    /// Coefficient of variation of inter-transaction intervals at or below
    /// which spacing counts as near-constant.
    #[serde(default = "default_bot_max_interval_cv")]
    pub max_interval_cv: f64,
    /// Mean interval below which activity counts as machine-speed.
    #[serde(default = "default_bot_min_mean_interval_secs")]
    pub min_mean_interval_secs: f64,
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self {
            min_transactions: default_bot_min_transactions(),
            max_interval_cv: default_bot_max_interval_cv(),
            min_mean_interval_secs: default_bot_min_mean_interval_secs(),
        }
    }
}

fn default_bot_min_transactions() -> u64 {
    20
}

fn default_bot_max_interval_cv() -> f64 {
    0.1
}

fn default_bot_min_mean_interval_secs() -> f64 {
    60.0
}

impl BotDetectionConfig {
    pub fn validate(&self) -> eyre::Result<()> {
        if !(self.max_interval_cv >= 0.0) || !(self.min_mean_interval_secs >= 0.0) {
            return Err(eyre::eyre!("Bot detection thresholds must be non-negative"));
        }
        Ok(())
    }
}

// ============================================================
// Token Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    #[serde(default = "default_token_decimals")]
    pub default_decimals: u32,
    #[serde(default = "default_token_assets")]
    pub assets: Vec<TokenConfig>,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            default_decimals: default_token_decimals(),
            assets: default_token_assets(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub decimals: u32,
}

fn default_token_decimals() -> u32 {
    18
}

fn default_token_assets() -> Vec<TokenConfig> {
    [
        ("USDC", 6),
        ("USDT", 6),
        ("WBTC", 8),
        ("DAI", 18),
        ("WETH", 18),
        ("WMATIC", 18),
        ("WPOL", 18),
        ("AAVE", 18),
    ]
    .into_iter()
    .map(|(symbol, decimals)| TokenConfig {
        symbol: symbol.to_string(),
        decimals,
    })
    .collect()
}

// ============================================================
// Report Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_markdown_file")]
    pub markdown_file: String,
    #[serde(default = "default_scores_csv")]
    pub scores_csv: String,
    pub summary_json: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            markdown_file: default_markdown_file(),
            scores_csv: default_scores_csv(),
            summary_json: None,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_markdown_file() -> String {
    "aave_wallet_credit_analysis.md".to_string()
}

fn default_scores_csv() -> String {
    "wallet_scores.csv".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        self.scoring.validate()?;
        self.bot_detection.validate()?;
        if self.tokens.default_decimals > 36 {
            return Err(eyre::eyre!(
                "Default token decimals {} is implausible",
                self.tokens.default_decimals
            ));
        }
        for token in &self.tokens.assets {
            if token.symbol.trim().is_empty() {
                return Err(eyre::eyre!("Token entries must have a non-empty symbol"));
            }
            if token.decimals > 36 {
                return Err(eyre::eyre!(
                    "Token '{}' has implausible decimals {}",
                    token.symbol,
                    token.decimals
                ));
            }
        }
        Ok(())
    }
}
