use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::commands;

/// Styles for CLI
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightCyan))),
    )
    .usage(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
}

#[derive(Debug, Parser)]
#[command(author, about, version)]
#[command(propagate_version = true)]
#[command(styles=get_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  #[clap(flatten)]
  pub verbose: Verbosity<InfoLevel>,

  /// Disable colored output
  #[arg(long, global = true)]
  pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Create a default VPC in every region of the target account where one is missing
  Create(commands::create::CreateDefaultVpcs),

  /// Delete the default VPC and its dependent resources in every region of the target account
  Delete(commands::delete::DeleteDefaultVpcs),
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn delete_requires_a_target() {
    let result = Cli::try_parse_from(["vpcctl", "delete"]);
    assert!(result.is_err());
  }

  #[test]
  fn delete_rejects_both_role_arn_and_name() {
    let result = Cli::try_parse_from([
      "vpcctl",
      "delete",
      "--target-account-id",
      "111111111111",
      "--assume-role-arn",
      "arn:aws:iam::111111111111:role/Admin",
      "--assume-role-name",
      "Admin",
    ]);
    assert!(result.is_err());
  }

  #[test]
  fn create_parses_minimal_invocation() {
    let cli = Cli::try_parse_from(["vpcctl", "create", "--account-id", "111111111111"]).unwrap();
    match cli.command {
      Commands::Create(create) => {
        assert_eq!(create.account_id, "111111111111");
        assert!(!create.dry_run);
      }
      _ => panic!("expected create subcommand"),
    }
  }

  #[test]
  fn delete_dry_run_defaults_to_true() {
    let cli = Cli::try_parse_from(["vpcctl", "delete", "--target-account-id", "111111111111"]).unwrap();
    match cli.command {
      Commands::Delete(delete) => assert!(delete.dry_run),
      _ => panic!("expected delete subcommand"),
    }
  }
}
