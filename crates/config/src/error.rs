#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("`{0}` is empty")]
    Empty(&'static str),
    #[error("`{0}` must be 32 bytes of hex")]
    InvalidSigningKey(&'static str),
    #[error("`{field}` is not an http(s) url: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("`{0}` is missing 0x prefix")]
    Missing0xPrefix(&'static str),
    #[error("`{field}` is not a 20 bytes hex address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}
