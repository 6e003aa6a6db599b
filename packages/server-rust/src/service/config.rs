use crate::observability::LogConfig;

/// Server-level configuration for the write path.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Whether commands may set `bypassDocumentValidation`. When false such
    /// commands are rejected instead of silently validated.
    pub allow_document_validation_bypass: bool,
    /// Logging setup applied by [`init_tracing`](crate::observability::init_tracing).
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allow_document_validation_bypass: true,
            log: LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert!(config.allow_document_validation_bypass);
        assert_eq!(config.log.filter, "info");
        assert!(!config.log.json);
    }
}
