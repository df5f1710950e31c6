//! Output formatting for CLI commands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::args::{LookupArgs, OutputFormat};
use crate::engine::EngineStats;
use crate::error::Result;
use crate::lookup::types::{BookHit, TocHit, TokenClause};

/// Result of a book search.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResults {
    pub query: String,
    pub clauses: Vec<TokenClause>,
    pub hits: Vec<BookHit>,
    pub duration_ms: u64,
}

/// Result of a table-of-contents search.
#[derive(Debug, Serialize, Deserialize)]
pub struct TocResults {
    pub query: String,
    pub clauses: Vec<TokenClause>,
    pub hits: Vec<TocHit>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizeResult {
    pub input: String,
    pub normalized: String,
    pub tokens: Vec<String>,
}

/// One dictionary group as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub base: Option<String>,
    pub terms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpandResult {
    pub token: String,
    pub dictionary_available: bool,
    pub groups: Vec<GroupView>,
    /// The group queries use for this token.
    pub chosen: Option<GroupView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResult {
    pub query: String,
    pub normalized: String,
    pub clauses: Vec<TokenClause>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResult {
    pub index_dir: PathBuf,
    pub num_docs: u64,
    #[serde(flatten)]
    pub engine: EngineStats,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self);
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &LookupArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &LookupArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

fn print_clauses(clauses: &[TokenClause]) {
    for (i, clause) in clauses.iter().enumerate() {
        println!("  {}. {} -> {}", i + 1, clause.token, clause.alternatives.join(" | "));
    }
}

impl HumanOutput for BookResults {
    fn print_human(&self) {
        if self.hits.is_empty() {
            println!("No books match '{}'", self.query);
            return;
        }

        println!("Books:");
        println!("══════");
        for (i, hit) in self.hits.iter().enumerate() {
            let marker = if hit.is_base_book { "*" } else { " " };
            println!(
                "{:>3}. {} {} (id {}, category {}, order {})",
                i + 1,
                marker,
                hit.title,
                hit.id,
                hit.category_id,
                hit.order_index
            );
        }
        println!();
        println!("{} hit(s) in {}ms", self.hits.len(), self.duration_ms);
    }
}

impl HumanOutput for TocResults {
    fn print_human(&self) {
        if self.hits.is_empty() {
            println!("No table-of-contents entries match '{}'", self.query);
            return;
        }

        println!("Table of contents:");
        println!("══════════════════");
        for (i, hit) in self.hits.iter().enumerate() {
            let indent = "  ".repeat(hit.level.saturating_sub(1) as usize);
            println!(
                "{:>3}. {}{} / {} (toc {}, book {}, score {:.3})",
                i + 1,
                indent,
                hit.book_title,
                hit.text,
                hit.toc_id,
                hit.book_id,
                hit.score
            );
        }
        println!();
        println!("{} hit(s) in {}ms", self.hits.len(), self.duration_ms);
    }
}

impl HumanOutput for NormalizeResult {
    fn print_human(&self) {
        println!("normalized: {}", self.normalized);
        println!("tokens: {}", self.tokens.join(", "));
    }
}

impl HumanOutput for ExpandResult {
    fn print_human(&self) {
        if !self.dictionary_available {
            println!("No dictionary loaded");
            return;
        }
        if self.groups.is_empty() {
            println!("'{}' is not in the dictionary", self.token);
            return;
        }

        println!("Groups for '{}':", self.token);
        for group in &self.groups {
            let chosen = self.chosen.as_ref() == Some(group);
            println!(
                "  {} [{}] {}",
                if chosen { "*" } else { " " },
                group.base.as_deref().unwrap_or("-"),
                group.terms.join(" ")
            );
        }
    }
}

impl HumanOutput for ExplainResult {
    fn print_human(&self) {
        if self.clauses.is_empty() {
            println!("Blank query: nothing to search");
            return;
        }
        println!("normalized: {}", self.normalized);
        println!("every clause must match as a prefix:");
        print_clauses(&self.clauses);
    }
}

impl HumanOutput for StatsResult {
    fn print_human(&self) {
        println!("Lookup Statistics:");
        println!("══════════════════");
        println!("Index: {}", self.index_dir.display());
        match self.engine.gateway.generation {
            Some(generation) => println!("Generation: {generation}"),
            None => println!("Generation: not opened"),
        }
        println!("Documents: {}", self.num_docs);
        println!("Queries executed: {}", self.engine.gateway.queries_executed);
        println!("Cache hits: {}", self.engine.gateway.cache_hits);
        println!("Refreshes: {}", self.engine.gateway.refreshes);
        println!("Searchers in use: {}", self.engine.gateway.searchers_in_use);
        if self.engine.dictionary_available {
            println!(
                "Dictionary: {} terms in {} groups",
                self.engine.dictionary_terms, self.engine.dictionary_groups
            );
        } else {
            println!("Dictionary: not loaded");
        }
    }
}
