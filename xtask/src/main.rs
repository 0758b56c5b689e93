// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations CI runs and adds `verify-migrations`, which
//! applies the ledger's embedded migrations to a scratch `SQLite` database
//! and checks the resulting schema:
//!
//! - every ledger table and column is present
//! - cycles are unique per `(employee_id, years_of_service)`
//! - request keys and operation keys are unique
//! - the cycle invariant `days_used + days_available = days_earned` is
//!   enforced by a check constraint
//! - the migrations revert cleanly

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, verify migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply the migrations to a scratch database and check the schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, verify migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run all workspace tests, doc tests last because they are slow
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])?;
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Columns each ledger table must carry.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "employees",
        &["employee_id", "office_id", "full_name", "hire_date", "is_active"],
    ),
    (
        "vacation_cycles",
        &[
            "cycle_id",
            "employee_id",
            "years_of_service",
            "cycle_start_date",
            "cycle_end_date",
            "days_earned",
            "days_used",
            "days_available",
            "is_expired",
            "version",
        ],
    ),
    (
        "vacation_requests",
        &[
            "request_id",
            "employee_id",
            "office_id",
            "start_date",
            "end_date",
            "days_requested",
            "status",
            "request_key",
            "allocation_json",
        ],
    ),
    (
        "audit_events",
        &[
            "event_id",
            "employee_id",
            "operation_key",
            "actor_json",
            "cause_json",
            "action_json",
            "before_snapshot_json",
            "after_snapshot_json",
        ],
    ),
];

/// Unique constraints the ledger relies on for idempotency.
const REQUIRED_UNIQUE: &[(&str, &[&str])] = &[
    ("vacation_cycles", &["employee_id", "years_of_service"]),
    ("vacation_requests", &["request_key"]),
    ("audit_events", &["operation_key"]),
];

/// Apply the migrations to a scratch database and check the schema
///
/// Uses an in-memory `SQLite` database, so no infrastructure is needed.
fn verify_migrations() -> Result<()> {
    tracing::info!("Applying migrations to a scratch SQLite database");
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;

    tracing::info!("Introspecting schema");
    let schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;

    tracing::info!("Checking constraint enforcement");
    check_constraints(&mut conn)?;

    tracing::info!("Reverting migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover = introspect_sqlite_schema(&mut conn)?;
    if !leftover.tables.is_empty() {
        return Err(eyre!(
            "Tables left after reverting migrations: {:?}",
            leftover.tables.keys().collect::<Vec<_>>()
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Check tables, columns, unique constraints and foreign keys
fn check_schema(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for (table_name, columns) in REQUIRED_COLUMNS {
        let Some(table) = schema.tables.get(*table_name) else {
            errors.push(format!("Missing table: {table_name}"));
            continue;
        };
        for column in *columns {
            if !table.columns.contains_key(*column) {
                errors.push(format!("Missing column: {table_name}.{column}"));
            }
        }
        if table.primary_keys.len() != 1 {
            errors.push(format!(
                "Table {table_name} should have a single-column primary key, found {:?}",
                table.primary_keys
            ));
        }
    }

    for (table_name, columns) in REQUIRED_UNIQUE {
        let expected = UniqueConstraint {
            columns: columns.iter().map(ToString::to_string).collect(),
        };
        let present = schema
            .tables
            .get(*table_name)
            .is_some_and(|t| t.unique_constraints.contains(&expected));
        if !present {
            errors.push(format!("Missing unique constraint on {table_name}{columns:?}"));
        }
    }

    for table_name in ["vacation_cycles", "vacation_requests", "audit_events"] {
        let references_employee = schema.tables.get(table_name).is_some_and(|t| {
            t.foreign_keys.contains(&ForeignKey {
                from_column: String::from("employee_id"),
                to_table: String::from("employees"),
                to_column: String::from("employee_id"),
            })
        });
        if !references_employee {
            errors.push(format!(
                "Missing foreign key {table_name}.employee_id -> employees.employee_id"
            ));
        }
    }

    for (table_name, table) in &schema.tables {
        for column in table.columns.values() {
            tracing::debug!(
                "{table_name}.{} {} {}",
                column.name,
                column.normalized_type,
                if column.nullable { "NULL" } else { "NOT NULL" }
            );
        }
        for index in &table.indexes {
            tracing::debug!("{table_name} index {} on {:?}", index.name, index.columns);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            tracing::error!("{error}");
        }
        Err(eyre!("Schema verification failed with {} error(s)", errors.len()))
    }
}

/// Insert rows that the constraints must reject, inside a rolled-back transaction
fn check_constraints(conn: &mut SqliteConnection) -> Result<()> {
    let outcome: Result<()> = conn.transaction::<(), diesel::result::Error, _>(|conn| {
        diesel::sql_query(
            "INSERT INTO employees (employee_id, office_id, full_name, hire_date, created_at) \
             VALUES (1, 1, 'Scratch Employee', '2020-03-15', '2026-01-01')",
        )
        .execute(conn)?;
        diesel::sql_query(
            "INSERT INTO vacation_cycles (employee_id, years_of_service, cycle_start_date, \
             cycle_end_date, days_earned, days_used, days_available) \
             VALUES (1, 1, '2021-03-15', '2022-09-15', 12, 0, 12)",
        )
        .execute(conn)?;

        let rejected: [(&str, &str); 4] = [
            (
                "cycle breaking used + available = earned",
                "INSERT INTO vacation_cycles (employee_id, years_of_service, cycle_start_date, \
                 cycle_end_date, days_earned, days_used, days_available) \
                 VALUES (1, 2, '2022-03-15', '2023-09-15', 14, 3, 3)",
            ),
            (
                "second cycle for the same service year",
                "INSERT INTO vacation_cycles (employee_id, years_of_service, cycle_start_date, \
                 cycle_end_date, days_earned, days_used, days_available) \
                 VALUES (1, 1, '2021-03-15', '2022-09-15', 12, 0, 12)",
            ),
            (
                "request with an unknown status",
                "INSERT INTO vacation_requests (employee_id, office_id, start_date, end_date, \
                 days_requested, status, created_at, updated_at) \
                 VALUES (1, 1, '2024-07-01', '2024-07-05', 3, 'archived', '2026-01-01', '2026-01-01')",
            ),
            (
                "cycle for an unknown employee",
                "INSERT INTO vacation_cycles (employee_id, years_of_service, cycle_start_date, \
                 cycle_end_date, days_earned, days_used, days_available) \
                 VALUES (99, 1, '2021-03-15', '2022-09-15', 12, 0, 12)",
            ),
        ];

        for (description, sql) in rejected {
            if diesel::sql_query(sql).execute(conn).is_ok() {
                tracing::error!("Constraint not enforced: {description}");
                return Err(diesel::result::Error::RollbackTransaction);
            }
            tracing::debug!("Rejected as expected: {description}");
        }

        // Leave the scratch database empty for the revert check
        Err(diesel::result::Error::RollbackTransaction)
    })
    .map_or_else(
        |err| match err {
            diesel::result::Error::RollbackTransaction => Ok(()),
            other => Err(eyre!("Constraint check failed: {other}")),
        },
        |()| Ok(()),
    );
    outcome?;

    let remaining: Vec<CountRow> =
        diesel::sql_query("SELECT COUNT(*) AS count FROM vacation_cycles").load(conn)?;
    if remaining.first().map_or(0, |r| r.count) != 0 {
        return Err(eyre!("Constraint check left rows behind"));
    }
    Ok(())
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = Integer)]
    count: i32,
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // Origin 'u' marks a UNIQUE constraint, including sqlite_autoindex_*
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type names
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") {
        String::from("INTEGER")
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        String::from("TEXT")
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        String::from("REAL")
    } else {
        upper
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
