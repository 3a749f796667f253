use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "students-api")]
#[command(about = "Students API - CRUD service for student records")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override HOST
        #[arg(long)]
        host: Option<String>,

        /// Override PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the environment configuration without starting the server
    Validate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `serve` with no overrides when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["students-api"]).unwrap();
        assert_eq!(
            cli.command(),
            Commands::Serve {
                host: None,
                port: None
            }
        );
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["students-api", "serve", "--host", "127.0.0.1", "-p", "8080"])
                .unwrap();
        assert_eq!(
            cli.command(),
            Commands::Serve {
                host: Some("127.0.0.1".to_string()),
                port: Some(8080)
            }
        );
    }

    #[test]
    fn test_validate_and_bad_port() {
        let cli = Cli::try_parse_from(["students-api", "validate"]).unwrap();
        assert_eq!(cli.command(), Commands::Validate);

        assert!(Cli::try_parse_from(["students-api", "serve", "--port", "99999"]).is_err());
    }
}
