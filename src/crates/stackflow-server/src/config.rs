//! Server options.
//!
//! Provider credentials (`GOOGLE_API_KEY`, `SERPAPI_API_KEY`, `CHROMA_HOST`,
//! `CHROMA_PORT`) are read by the collaborator configs themselves; only the
//! server-side knobs live here.

use clap::Parser;
use std::path::PathBuf;

/// Command-line and environment options for the server binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "stackflow-server", version, about = "Stackflow HTTP API server")]
pub struct ServerOptions {
    /// Address to bind.
    #[arg(long, env = "STACKFLOW_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "STACKFLOW_PORT", default_value_t = 8000)]
    pub port: u16,

    /// SQLite database URL.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://stackflow.db")]
    pub database_url: String,

    /// Directory uploaded files are stored in.
    #[arg(long, env = "STACKFLOW_UPLOAD_DIR", default_value = "./uploaded_files")]
    pub upload_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let options = ServerOptions::parse_from(["stackflow-server"]);
        assert_eq!(options.host, "127.0.0.1");
        assert_eq!(options.port, 8000);
    }

    #[test]
    fn flags_override_defaults() {
        let options =
            ServerOptions::parse_from(["stackflow-server", "--port", "9001", "--host", "0.0.0.0"]);
        assert_eq!(options.port, 9001);
        assert_eq!(options.host, "0.0.0.0");
    }
}
