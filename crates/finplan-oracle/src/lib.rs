mod openai;
mod traits;

pub use openai::OpenAiOracle;
pub use traits::{
    Oracle, OracleConfig, OracleError, OracleRequest, OracleType, DEFAULT_API_KEY_ENV,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};

/// Create an oracle by type
pub fn create_oracle(
    oracle_type: OracleType,
    config: OracleConfig,
) -> Result<Box<dyn Oracle>, OracleError> {
    match oracle_type {
        OracleType::OpenAi => Ok(Box::new(OpenAiOracle::new(config)?)),
    }
}
