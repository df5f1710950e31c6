//! Boolean prefix query construction.

use tantivy::Term;
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::IndexRecordOption;

use crate::error::{LookupError, Result};
use crate::lookup::schema::LookupFields;
use crate::lookup::types::{DocKind, TokenClause};

/// Build the lookup query for `kind`.
///
/// Shape: a non-scoring filter on `type`, then one `Must` clause per token.
/// A token clause with several alternatives becomes a `Should` union of
/// prefix queries, so the token matches if any alternative does.
pub fn build_lookup_query(
    fields: &LookupFields,
    kind: DocKind,
    clauses: &[TokenClause],
) -> Result<Box<dyn Query>> {
    if clauses.is_empty() {
        return Err(LookupError::query("lookup query needs at least one token"));
    }

    let kind_filter = TermQuery::new(
        Term::from_field_text(fields.kind, kind.as_str()),
        IndexRecordOption::Basic,
    );
    let mut subqueries: Vec<(Occur, Box<dyn Query>)> = vec![(
        Occur::Must,
        Box::new(ConstScoreQuery::new(Box::new(kind_filter), 0.0)),
    )];

    for clause in clauses {
        subqueries.push((Occur::Must, token_query(fields, clause)?));
    }

    Ok(Box::new(BooleanQuery::new(subqueries)))
}

fn token_query(fields: &LookupFields, clause: &TokenClause) -> Result<Box<dyn Query>> {
    let mut prefixes = Vec::with_capacity(clause.alternatives.len());
    for alt in &clause.alternatives {
        prefixes.push(prefix_query(fields, alt)?);
    }

    match prefixes.len() {
        0 => Err(LookupError::query(format!(
            "token '{}' has no alternatives",
            clause.token
        ))),
        1 => Ok(prefixes.remove(0)),
        _ => Ok(Box::new(BooleanQuery::union(prefixes))),
    }
}

/// Match any `q` term starting with `prefix`.
///
/// `q` is indexed through tantivy's `default` tokenizer, which lowercases,
/// and a regex query is not analyzed, so the prefix is lowercased here.
fn prefix_query(fields: &LookupFields, prefix: &str) -> Result<Box<dyn Query>> {
    let pattern = format!("{}.*", escape_for_regex(&prefix.to_lowercase()));
    let query = RegexQuery::from_pattern(&pattern, fields.q)
        .map_err(|e| LookupError::query(format!("invalid prefix '{prefix}': {e}")))?;
    Ok(Box::new(query))
}

fn escape_for_regex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
