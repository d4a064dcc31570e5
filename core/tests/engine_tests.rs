use marksearch_core::{EngineConfig, EngineError, Posting, SearchEngine};
use std::path::Path;
use tempfile::tempdir;

fn open_engine(dir: &Path) -> SearchEngine {
    SearchEngine::open(&EngineConfig {
        data_dir: dir.to_path_buf(),
        stop_words_path: None,
    })
    .unwrap()
}

#[test]
fn indexing_records_positions_and_line_numbers() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());

    let id = engine
        .add_document("pets.txt", "The cat runs.\nThe dog ran.")
        .unwrap();
    assert_eq!(id, 1);

    // raw whitespace count, stop words included
    assert_eq!(engine.document(id).unwrap().word_count, 6);

    let posting = |position, line_number| Posting { doc_id: 1, position, line_number };
    assert_eq!(engine.postings("cat").unwrap(), vec![posting(0, 1)]);
    assert_eq!(engine.postings("run").unwrap(), vec![posting(1, 1)]);
    assert_eq!(engine.postings("dog").unwrap(), vec![posting(2, 2)]);
    assert_eq!(engine.postings("ran").unwrap(), vec![posting(3, 2)]);
}

#[test]
fn document_ids_increase_monotonically_from_one() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    for expected in 1..=3 {
        let id = engine.add_document("doc.txt", "wolf").unwrap();
        assert_eq!(id, expected);
    }
}

#[test]
fn unknown_document_id_is_not_found() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    match engine.document(42) {
        Err(EngineError::NotFound(42)) => {}
        other => panic!("expected NotFound(42), got {other:?}"),
    }
}

#[test]
fn matching_uses_the_exact_stemmed_value() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    // "run" stems to "run", "running" stems to "runn"; the query stem
    // decides which rows match
    engine.add_document("run.txt", "run\nrunning").unwrap();

    let results = engine.search("running", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].relevance_score, 1);
    assert_eq!(results[0].matching_lines.len(), 1);
    assert_eq!(results[0].matching_lines[0].line_number, 2);
    assert_eq!(results[0].matching_lines[0].content, "<mark>runn</mark>ing");

    let results = engine.search("runs", 10).unwrap();
    assert_eq!(results[0].relevance_score, 1);
    assert_eq!(results[0].matching_lines[0].line_number, 1);
    assert_eq!(results[0].matching_lines[0].content, "<mark>run</mark>");
}

#[test]
fn empty_and_filtered_out_queries_return_nothing() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    engine.add_document("doc.txt", "wolf").unwrap();

    assert!(engine.search("", 10).unwrap().is_empty());
    assert!(engine.search("the and of", 10).unwrap().is_empty());
    assert!(engine.search("?!...", 10).unwrap().is_empty());
}

#[test]
fn ranking_orders_by_match_count_then_document_id() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    engine.add_document("one.txt", "wolf").unwrap();
    engine.add_document("three.txt", "wolf wolf wolf").unwrap();
    engine.add_document("tie.txt", "wolf").unwrap();

    let results = engine.search("wolf", 10).unwrap();
    let order: Vec<_> = results
        .iter()
        .map(|r| (r.document_id, r.relevance_score))
        .collect();
    assert_eq!(order, vec![(2, 3), (1, 1), (3, 1)]);

    let truncated = engine.search("wolf", 2).unwrap();
    assert_eq!(truncated.len(), 2);
}

#[test]
fn repeated_query_stems_do_not_double_count() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    engine.add_document("cats.txt", "cat cat").unwrap();

    // "cats" and "cat" both stem to "cat"
    let results = engine.search("cats cat", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].relevance_score, 2);
}

#[test]
fn at_most_five_matching_lines_per_document() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    let content = (0..8)
        .map(|i| format!("fox line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    engine.add_document("fox.txt", &content).unwrap();

    let results = engine.search("fox", 10).unwrap();
    assert_eq!(results[0].relevance_score, 8);
    let lines: Vec<u32> = results[0]
        .matching_lines
        .iter()
        .map(|l| l.line_number)
        .collect();
    assert_eq!(lines, vec![1, 2, 3, 4, 5]);
}

#[test]
fn round_trip_line_numbers_match_the_stored_content() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    let content = "alpha beta\ngamma delta\nepsilon wolf zeta";
    engine.add_document("greek.txt", content).unwrap();

    let results = engine.search("wolf", 10).unwrap();
    assert_eq!(results.len(), 1);
    let line = &results[0].matching_lines[0];
    assert_eq!(line.line_number, 3);
    assert!(content.split('\n').nth(2).unwrap().contains("wolf"));
    assert_eq!(line.content, "epsilon <mark>wolf</mark> zeta");
}

#[test]
fn state_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let engine = open_engine(dir.path());
        engine.add_document("keep.txt", "durable wolf").unwrap();
    }
    let engine = open_engine(dir.path());
    let results = engine.search("wolf", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].filename, "keep.txt");
    assert_eq!(engine.document(1).unwrap().content, "durable wolf");
}

#[test]
fn stats_aggregates_documents_and_words() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    engine.add_document("a.txt", "wolf wolf moon").unwrap();
    engine.add_document("b.txt", "moon").unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.document_count, 2);
    assert_eq!(stats.unique_word_count, 2);
    assert_eq!(stats.total_indexed_occurrences, 4);
    // frequency ties order by word ascending
    assert_eq!(
        stats.top_words,
        vec![("moon".to_string(), 2), ("wolf".to_string(), 2)]
    );
}

#[test]
fn document_with_no_surviving_tokens_still_exists() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path());
    let id = engine.add_document("empty.txt", "a I ...").unwrap();

    assert_eq!(engine.document(id).unwrap().word_count, 3);
    let stats = engine.stats().unwrap();
    assert_eq!(stats.document_count, 1);
    assert_eq!(stats.total_indexed_occurrences, 0);
    assert!(engine.search("empty", 10).unwrap().is_empty());
}
