//! Session orchestration against scripted AI and literature backends.

use std::sync::Arc;
use std::time::Duration;

use genelinker_agent::{AnalysisReport, Delivery, NoticeLevel, ResearchSession};
use genelinker_common::{FallbackReason, PaperRecord, SearchPage};
use genelinker_literature::mock::ScriptedSource;
use genelinker_literature::{LiteratureService, SourceError};
use genelinker_llm::mock::{Scripted, ScriptedBackend};
use genelinker_llm::ResearchAssistant;
use genelinker_mindmap::NodeKind;
use pretty_assertions::assert_eq;

struct Harness {
    session: ResearchSession,
    backend: Arc<ScriptedBackend>,
    source: Arc<ScriptedSource>,
}

fn harness(backend: ScriptedBackend, source: ScriptedSource) -> Harness {
    let backend = Arc::new(backend);
    let source = Arc::new(source);
    let session = ResearchSession::new(
        ResearchAssistant::new(backend.clone()),
        LiteratureService::new(source.clone()),
    );
    Harness { session, backend, source }
}

fn empty_source() -> ScriptedSource {
    ScriptedSource::returning(SearchPage { papers: vec![], total_results: 0 })
}

fn analysis_json(title: &str) -> String {
    serde_json::json!({
        "title": title,
        "summary": "Summary",
        "key_findings": ["Finding one", "Finding two", "Finding three", "Finding four"],
        "methodology": "Cohort study",
        "conclusions": "",
        "research_gaps": ["Gap"],
        "future_directions": ["Next", "Later"],
        "confidence_score": 0.9
    })
    .to_string()
}

#[tokio::test]
async fn test_late_answer_is_discarded() {
    let backend = ScriptedBackend::new()
        .then(Scripted::Delayed(Duration::from_millis(200), "answer A".into()))
        .then(Scripted::Reply("answer B".into()));
    let h = harness(backend, empty_source());

    let a = h.session.ask("question A").unwrap();
    let b = h.session.ask("question B").unwrap();
    let (a, b) = tokio::join!(a, b);

    assert_eq!(a.unwrap(), Delivery::Superseded);
    assert!(b.unwrap().is_current());
    assert_eq!(h.session.answer().unwrap().value(), "answer B");
    assert_eq!(h.backend.calls(), 2);
    assert!(!h.session.is_busy());
}

#[tokio::test]
async fn test_older_result_is_dropped_even_when_it_finishes_first() {
    let backend = ScriptedBackend::new()
        .then(Scripted::Reply("answer A".into()))
        .then(Scripted::Reply("answer B".into()));
    let h = harness(backend, empty_source());

    let a = h.session.ask("question A").unwrap();
    let b = h.session.ask("question B").unwrap();
    assert_eq!(a.await.unwrap(), Delivery::Superseded);
    assert!(h.session.answer().is_none());
    assert!(h.session.is_busy());

    b.await.unwrap();
    assert_eq!(h.session.answer().unwrap().value(), "answer B");
}

#[tokio::test]
async fn test_slots_are_independent() {
    let backend = ScriptedBackend::new()
        .then(Scripted::Delayed(Duration::from_millis(50), "answer".into()))
        .then(Scripted::Reply("TP53 summary".into()));
    let h = harness(backend, empty_source());

    let ask = h.session.ask("What is apoptosis?").unwrap();
    let gene = h.session.link_gene("tp53").unwrap();
    let (ask, gene) = tokio::join!(ask, gene);
    assert!(ask.unwrap().is_current());
    assert!(gene.unwrap().is_current());
    assert_eq!(h.session.gene_report().unwrap().value().gene_id, "TP53");
}

#[tokio::test]
async fn test_blank_input_issues_nothing() {
    let h = harness(ScriptedBackend::replying("unused"), empty_source());

    assert!(h.session.ask("   ").err().unwrap().is_user_input());
    assert!(h.session.link_gene("\t").err().unwrap().is_user_input());
    assert!(h.session.search("", Some(5)).err().unwrap().is_user_input());
    assert!(h.session.analyze("Title", " \n ").err().unwrap().is_user_input());

    assert_eq!(h.backend.calls(), 0);
    assert_eq!(h.source.calls(), 0);
    assert!(!h.session.is_busy());
    assert!(h.session.take_notices().is_empty());
}

#[tokio::test]
async fn test_abandoned_request_does_not_leave_session_busy() {
    let h = harness(ScriptedBackend::replying("late answer"), empty_source());

    let abandoned = h.session.ask("question A").unwrap();
    assert!(h.session.is_busy());
    drop(abandoned);
    assert!(!h.session.is_busy());
    assert_eq!(h.backend.calls(), 0);

    let next = h.session.ask("question B").unwrap();
    assert!(next.await.unwrap().is_current());
    assert_eq!(h.session.answer().unwrap().value(), "late answer");
    assert!(!h.session.is_busy());
}

#[tokio::test]
async fn test_search_falls_back_to_samples() {
    let source = ScriptedSource::failing(SourceError::MissingCredential("CORE".into()));
    let h = harness(ScriptedBackend::new(), source);

    let outcome = h.session.search("CRISPR", None).unwrap().await.unwrap().into_current().unwrap();
    assert_eq!(outcome.reason(), Some(&FallbackReason::MissingCredential));
    let papers = &outcome.value().papers;
    assert_eq!(papers.len(), 3);
    assert!(papers.iter().all(|p| p.title.contains("CRISPR")));
    assert_eq!(h.source.last_query(), Some(("CRISPR".to_string(), 10)));

    let notices = h.session.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_analysis_builds_mind_map() {
    let h = harness(ScriptedBackend::replying(analysis_json("Tumour heterogeneity")), empty_source());
    assert!(h.session.with_canvas(|_| ()).is_none());

    let outcome = h.session.analyze("", "paper text").unwrap().await.unwrap().into_current().unwrap();
    assert!(!outcome.is_degraded());

    let (nodes, leaves, central) = h
        .session
        .with_canvas(|c| {
            let map = c.map();
            let leaves = map.nodes.iter().filter(|n| n.kind == NodeKind::Leaf).count();
            (map.nodes.len(), leaves, map.central().map(|n| n.label.clone()))
        })
        .unwrap();
    // findings capped at 3, methodology 1, conclusions blank, 1 gap, 2 directions
    assert_eq!(leaves, 7);
    assert_eq!(nodes, 1 + 5 + 7);
    assert_eq!(central.as_deref(), Some("Tumour heterogeneity"));
}

#[tokio::test]
async fn test_stale_analysis_does_not_replace_mind_map() {
    let backend = ScriptedBackend::new()
        .then(Scripted::Delayed(Duration::from_millis(150), analysis_json("Old analysis")))
        .then(Scripted::Reply(analysis_json("New analysis")));
    let h = harness(backend, empty_source());

    let old = h.session.analyze("", "first paper").unwrap();
    let new = h.session.analyze("", "second paper").unwrap();
    let (old, new) = tokio::join!(old, new);
    assert_eq!(old.unwrap(), Delivery::Superseded);
    assert!(new.unwrap().is_current());

    let central = h.session.with_canvas(|c| c.map().central().map(|n| n.label.clone())).flatten();
    assert_eq!(central.as_deref(), Some("New analysis"));
}

#[tokio::test]
async fn test_analyze_record_and_report() {
    let h = harness(ScriptedBackend::replying("not json at all"), empty_source());
    let paper = PaperRecord {
        id: "core_42".into(),
        title: "Single-cell atlas of glioblastoma".into(),
        abstract_text: "We profiled 50,000 cells.".into(),
        authors: vec!["A. Author".into()],
        journal: "Cell".into(),
        year: "2023".into(),
        doi: Some("10.1016/j.cell.2023.01.001".into()),
        pdf_url: None,
        citation_count: 12,
        relevance_score: Some(0.8),
    };

    let outcome = h.session.analyze_record(&paper).unwrap().await.unwrap().into_current().unwrap();
    assert_eq!(outcome.reason(), Some(&FallbackReason::MalformedResponse));
    assert_eq!(outcome.value().title, "Single-cell atlas of glioblastoma");
    assert!(h.backend.requests()[0].messages[1].content.contains("We profiled 50,000 cells."));

    let dir = tempfile::tempdir().unwrap();
    let path = AnalysisReport::new(&outcome).with_paper(paper).export_json(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "analysis_single_cell_atlas_of_glioblastoma.json");
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["paper"]["id"], "core_42");
    assert_eq!(saved["fallback_reason"]["kind"], "malformed_response");
}
