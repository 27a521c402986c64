//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cluster <label>`: Direct this invocation at the named cluster
//!
//! # Declarative surface
//!
//! The clap tree is the single source of truth for names, usage lines,
//! long descriptions, examples (after_help), and recognized environment
//! variables. Positional values whose absence must surface as a typed
//! `missing_argument` error are declared optional here and validated
//! first in their handlers, before any UI or network activity.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cape - administration client for a Cape coordinator cluster
#[derive(Parser, Debug)]
#[command(name = "cape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Direct this invocation at the named cluster instead of the
    /// current one
    #[arg(long, global = true, value_name = "LABEL")]
    pub cluster: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments, returning clap's error rather
    /// than exiting so the caller controls rendering and exit codes.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and edit the local CLI configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage users on the cluster
    #[command(name = "users")]
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Inspect and assign roles
    #[command(name = "roles")]
    Roles {
        #[command(subcommand)]
        command: RolesCommand,
    },

    /// Issue, list, and revoke API tokens for the current user
    #[command(name = "tokens")]
    Tokens {
        #[command(subcommand)]
        command: TokensCommand,
    },

    /// Manage projects on the cluster
    #[command(name = "projects")]
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },

    /// Authenticate against the current cluster
    #[command(
        name = "login",
        long_about = "Authenticate against the current cluster.\n\n\
            Prompts for an email (unless given) and a password, exchanges \
            them for a session token, and stores the token on the cluster \
            record. If CAPE_PASSWORD is set it substitutes for the \
            interactive password prompt.",
        after_help = "\
EXAMPLES:
    # Interactive login
    cape login

    # Non-interactive login (CI)
    CAPE_PASSWORD=... cape login admin@cape.com"
    )]
    Login {
        /// Email to authenticate as (prompted when omitted)
        email: Option<String>,
    },

    /// Discard the stored session for the current cluster
    #[command(name = "logout")]
    Logout,

    /// Apply database migrations to the coordinator database
    #[command(
        name = "update",
        long_about = "Apply database migrations to the coordinator database.\n\n\
            Reads the database URL from CAPE_DB_URL and applies the \
            migrations found at the given filesystem paths, in order. \
            With no paths, './migrations' is used. Paths that do not \
            exist fail immediately without side effects.",
        after_help = "\
EXAMPLES:
    CAPE_DB_URL=postgres://localhost/cape cape update
    CAPE_DB_URL=postgres://localhost/cape cape update ./db/migrations"
    )]
    Update {
        /// Migration directories, applied in order
        paths: Vec<PathBuf>,
    },
}

/// `cape config` sub-commands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current configuration as YAML
    View,

    /// Manage registered clusters
    Clusters {
        #[command(subcommand)]
        command: ClustersCommand,
    },
}

/// `cape config clusters` sub-commands.
#[derive(Subcommand, Debug)]
pub enum ClustersCommand {
    /// Register a cluster
    #[command(after_help = "\
EXAMPLES:
    cape config clusters add production https://prod.example
    cape config clusters add staging https://stage.example --use")]
    Add {
        /// Local label for the cluster
        label: Option<String>,
        /// Coordinator URL (http or https)
        url: Option<String>,
        /// Also make this the current cluster
        #[arg(long = "use")]
        use_cluster: bool,
    },

    /// Remove a registered cluster
    Remove {
        /// Label of the cluster to remove
        label: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Select the current cluster
    Use {
        /// Label of the cluster to select
        label: Option<String>,
    },
}

/// `cape users` sub-commands.
#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// Create a user; credentials are generated by the coordinator
    /// and shown exactly once
    Create {
        /// Email of the new user
        email: Option<String>,
    },
}

/// `cape roles` sub-commands.
#[derive(Subcommand, Debug)]
pub enum RolesCommand {
    /// Show your own role
    Me {
        /// Show your role within this project instead
        #[arg(long, value_name = "LABEL")]
        project: Option<String>,
    },

    /// Assign a role to a user
    #[command(after_help = "\
EXAMPLES:
    # Organization roles: admin, user
    cape roles set friend@cape.com admin

    # Project roles: owner, contributor, reviewer, member
    cape roles set friend@cape.com reviewer --project data-views")]
    Set {
        /// Email of the user
        email: Option<String>,
        /// Role label
        role: Option<String>,
        /// Assign within this project (uses project roles)
        #[arg(long, value_name = "LABEL")]
        project: Option<String>,
    },
}

/// `cape tokens` sub-commands.
#[derive(Subcommand, Debug)]
pub enum TokensCommand {
    /// Issue a token; the secret is shown exactly once
    Create,

    /// List your token ids
    List,

    /// Revoke a token
    Remove {
        /// Id of the token to revoke
        id: Option<String>,
    },
}

/// `cape projects` sub-commands.
#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// Create a project
    Create {
        /// Label for the project
        label: Option<String>,
        /// Free-form description
        description: Option<String>,
    },

    /// List projects visible to you
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_clusters_add_with_use() {
        let cli = Cli::try_parse_from([
            "cape", "config", "clusters", "add", "production", "https://prod.example", "--use",
        ])
        .unwrap();
        match cli.command {
            Command::Config {
                command:
                    ConfigCommand::Clusters {
                        command:
                            ClustersCommand::Add {
                                label,
                                url,
                                use_cluster,
                            },
                    },
            } => {
                assert_eq!(label.as_deref(), Some("production"));
                assert_eq!(url.as_deref(), Some("https://prod.example"));
                assert!(use_cluster);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn roles_set_accepts_missing_positionals() {
        // Presence is validated in the handler so the failure carries
        // the missing_argument cause instead of a clap usage error.
        let cli =
            Cli::try_parse_from(["cape", "roles", "set", "whahahdhshdashdsajkdhsa"]).unwrap();
        match cli.command {
            Command::Roles {
                command: RolesCommand::Set { email, role, .. },
            } => {
                assert_eq!(email.as_deref(), Some("whahahdhshdashdsajkdhsa"));
                assert!(role.is_none());
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn global_cluster_flag_reaches_leaves() {
        let cli = Cli::try_parse_from(["cape", "tokens", "list", "--cluster", "staging"]).unwrap();
        assert_eq!(cli.cluster.as_deref(), Some("staging"));
    }

    #[test]
    fn unknown_subcommand_is_a_parse_error() {
        assert!(Cli::try_parse_from(["cape", "frobnicate"]).is_err());
    }
}
