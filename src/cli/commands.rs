//! Command implementations for the lookup CLI.

use std::time::Instant;

use crate::analysis::normalizer::tokenize;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::engine::LookupEngine;
use crate::error::Result;
use crate::morphology::dictionary::Expansion;

/// Execute a CLI command.
pub fn execute_command(args: LookupArgs) -> Result<()> {
    let config = args.lookup_config()?;
    log::debug!("Using configuration: {config:?}");
    let engine = LookupEngine::open(config)?;

    let result = match &args.command {
        Command::Books(search) => search_books(&engine, search, &args),
        Command::Toc(search) => search_toc(&engine, search, &args),
        Command::Normalize(text) => normalize_text(&engine, text, &args),
        Command::Expand(text) => expand_token(&engine, text, &args),
        Command::Explain(text) => explain_query(&engine, text, &args),
        Command::Stats => show_stats(&engine, &args),
    };

    engine.close();
    result
}

fn search_books(engine: &LookupEngine, search: &SearchArgs, args: &LookupArgs) -> Result<()> {
    let limit = search.limit.unwrap_or(engine.config().default_limit);
    let start = Instant::now();
    let hits = engine.search_books_prefix(&search.query, limit)?;

    output_result(
        &BookResults {
            query: search.query.clone(),
            clauses: engine.plan(&search.query),
            hits,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        args,
    )
}

fn search_toc(engine: &LookupEngine, search: &SearchArgs, args: &LookupArgs) -> Result<()> {
    let limit = search.limit.unwrap_or(engine.config().default_limit);
    let start = Instant::now();
    let hits = engine.search_toc_prefix(&search.query, limit)?;

    output_result(
        &TocResults {
            query: search.query.clone(),
            clauses: engine.plan(&search.query),
            hits,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        args,
    )
}

fn normalize_text(engine: &LookupEngine, text: &TextArgs, args: &LookupArgs) -> Result<()> {
    let normalized = engine.normalize(&text.text);
    output_result(
        &NormalizeResult {
            input: text.text.clone(),
            tokens: tokenize(&normalized),
            normalized,
        },
        args,
    )
}

fn group_view(expansion: &Expansion) -> GroupView {
    GroupView {
        base: expansion.base.clone(),
        terms: expansion.terms.iter().cloned().collect(),
    }
}

fn expand_token(engine: &LookupEngine, text: &TextArgs, args: &LookupArgs) -> Result<()> {
    let token = engine.normalize(&text.text);
    let dictionary = engine.dictionary();

    let (groups, chosen) = match &dictionary {
        Some(dict) => (
            dict.expansions_for(&[token.as_str()])
                .iter()
                .map(|e| group_view(e))
                .collect(),
            dict.expansion_for(&token).map(|e| group_view(&e)),
        ),
        None => (Vec::new(), None),
    };

    output_result(
        &ExpandResult {
            token,
            dictionary_available: dictionary.is_some(),
            groups,
            chosen,
        },
        args,
    )
}

fn explain_query(engine: &LookupEngine, text: &TextArgs, args: &LookupArgs) -> Result<()> {
    output_result(
        &ExplainResult {
            query: text.text.clone(),
            normalized: engine.normalize(&text.text),
            clauses: engine.plan(&text.text),
        },
        args,
    )
}

fn show_stats(engine: &LookupEngine, args: &LookupArgs) -> Result<()> {
    let manager = engine.gateway().manager();
    manager.maybe_refresh()?;
    let num_docs = manager.acquire()?.searcher().num_docs();

    output_result(
        &StatsResult {
            index_dir: engine.config().index_dir.clone(),
            num_docs,
            engine: engine.stats(),
        },
        args,
    )
}
