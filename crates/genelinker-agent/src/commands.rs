//! Subcommand handlers. Results go to stdout; notices and logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use genelinker_agent::{AnalysisReport, Delivery, PreferenceStore, ResearchSession};
use genelinker_common::confidence::as_percent;
use genelinker_common::sandbox::SandboxClient;
use genelinker_common::{AnalysisResult, PaperRecord, QueryOutcome};
use genelinker_config::Config;
use genelinker_literature::{extract_entities, parse_pdf, PdfDownloader};
use genelinker_llm::fallback::mock_analysis;
use genelinker_mindmap::{export, MindMapCanvas, Point};
use serde::Serialize;

use crate::{ImageFormat, PrefsAction, ReportFormat};

pub struct Context {
    pub config: Config,
    pub json: bool,
}

impl Context {
    fn session(&self) -> anyhow::Result<ResearchSession> {
        Ok(ResearchSession::from_config(&self.config)?)
    }

    fn exports_dir(&self) -> PathBuf {
        self.config.workspace.exports_path()
    }

    fn client(&self) -> anyhow::Result<SandboxClient> {
        let mut client = SandboxClient::with_timeout(self.config.timeout())?;
        for domain in &self.config.http.extra_allowed_domains {
            client.allow_domain(domain);
        }
        Ok(client)
    }
}

pub enum AnalyzeInput {
    Text(String),
    Pdf(PathBuf),
}

pub async fn ask(ctx: &Context, question: &str) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let outcome = current(session.ask(question)?.await?)?;
    flush_notices(&session);
    if ctx.json {
        return print_json(&outcome);
    }
    println!("{}\n", outcome.value());
    print_meta(&outcome);
    Ok(())
}

pub async fn gene(ctx: &Context, gene_id: &str) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let outcome = current(session.link_gene(gene_id)?.await?)?;
    flush_notices(&session);
    if ctx.json {
        return print_json(&outcome);
    }
    let report = outcome.value();
    println!("{}\n", report.gene_id);
    println!("{}\n", report.summary);
    if !report.keywords.is_empty() {
        println!("Keywords: {}", report.keywords.join(", "));
    }
    println!("Related literature:");
    for paper in &report.papers {
        println!("  - {} ({} {}, relevance {})", paper.title, paper.journal, paper.year, as_percent(paper.relevance_score));
        println!("    {}", paper.url);
    }
    println!();
    print_meta(&outcome);
    Ok(())
}

pub async fn search(
    ctx: &Context,
    prefs: &mut PreferenceStore,
    query: &str,
    limit: Option<usize>,
    analyze: Option<usize>,
) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let outcome = current(session.search(query, limit)?.await?)?;
    flush_notices(&session);

    prefs.record_search(query);
    if let Err(e) = prefs.save() {
        tracing::warn!(error = %e, "could not save search history");
    }

    if ctx.json {
        print_json(&outcome)?;
    } else {
        let page = outcome.value();
        println!("{} results (showing {})\n", page.total_results, page.papers.len());
        for (i, paper) in page.papers.iter().enumerate() {
            print_paper(i + 1, paper);
        }
        print_meta(&outcome);
    }

    let Some(n) = analyze else { return Ok(()) };
    let paper = nth(&outcome.value().papers, n)?.clone();
    let analysis = current(session.analyze_record(&paper)?.await?)?;
    flush_notices(&session);
    if !ctx.json {
        println!();
        print_analysis(&analysis);
    }
    let path = AnalysisReport::new(&analysis).with_paper(paper).export_pdf(&ctx.exports_dir())?;
    println!("Report: {}", path.display());
    Ok(())
}

pub async fn analyze(
    ctx: &Context,
    input: AnalyzeInput,
    title: Option<String>,
    export: &[ReportFormat],
    mindmap: Option<ImageFormat>,
) -> anyhow::Result<()> {
    let (title, text, entities) = match input {
        AnalyzeInput::Pdf(path) => {
            let parsed = parse_pdf(&path)?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Uploaded paper");
            let title = title.unwrap_or_else(|| parsed.display_title(stem));
            eprintln!("Read {} pages, {} entities detected", parsed.page_count, parsed.entities.len());
            (title, parsed.full_text, parsed.entities)
        }
        AnalyzeInput::Text(text) => {
            let entities = extract_entities(&text);
            (title.unwrap_or_default(), text, entities)
        }
    };

    let session = ctx.session()?;
    let outcome = current(session.analyze(&title, &text)?.await?)?;
    flush_notices(&session);

    let report = AnalysisReport::new(&outcome).with_entities(entities);
    if ctx.json {
        print_json(&report)?;
    } else {
        print_analysis(&outcome);
        if !report.entities.is_empty() {
            let names: Vec<String> = report.entities.iter().map(|e| format!("{} ({})", e.name, e.kind.as_str())).collect();
            println!("Entities: {}", names.join(", "));
        }
    }

    let dir = ctx.exports_dir();
    if export.contains(&ReportFormat::Pdf) {
        println!("Report: {}", report.export_pdf(&dir)?.display());
    }
    if export.contains(&ReportFormat::Json) {
        println!("Report: {}", report.export_json(&dir)?.display());
    }
    if let Some(format) = mindmap {
        let path = session
            .with_canvas(|canvas| export_canvas(ctx, canvas, format, &report.title))
            .context("no mind map to export")??;
        println!("Mind map: {}", path.display());
    }
    Ok(())
}

pub fn mindmap(
    ctx: &Context,
    from: Option<&Path>,
    title: &str,
    format: ImageFormat,
    zoom: i32,
    pan: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let analysis = match from {
        Some(path) => read_analysis(path)?,
        None => mock_analysis(title),
    };
    let mut canvas = MindMapCanvas::new(&analysis);
    for _ in 0..zoom.unsigned_abs() {
        if zoom > 0 {
            canvas.zoom_in();
        } else {
            canvas.zoom_out();
        }
    }
    if let Some((dx, dy)) = pan {
        canvas.pointer_down(Point::new(0.0, 0.0));
        canvas.pointer_move(Point::new(dx, dy));
        canvas.pointer_up();
    }

    let title = if analysis.title.trim().is_empty() { title } else { analysis.title.as_str() };
    let path = export_canvas(ctx, &canvas, format, title)?;
    if ctx.json {
        return print_json(&serde_json::json!({
            "path": path,
            "view": canvas.view(),
            "nodes": canvas.map().nodes.len(),
        }));
    }
    println!(
        "Mind map: {} ({} nodes, zoom {:.0}%)",
        path.display(),
        canvas.map().nodes.len(),
        canvas.view().scale * 100.0
    );
    Ok(())
}

pub async fn download(ctx: &Context, query: &str, index: usize) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let outcome = current(session.search(query, None)?.await?)?;
    flush_notices(&session);
    let paper = nth(&outcome.value().papers, index)?;
    let path = PdfDownloader::new(ctx.client()?)
        .download_pdf(paper, &ctx.exports_dir())
        .await
        .with_context(|| format!("could not download \"{}\"", paper.title))?;
    println!("Saved {}", path.display());
    Ok(())
}

pub fn prefs(ctx: &Context, prefs: &mut PreferenceStore, action: PrefsAction) -> anyhow::Result<()> {
    let message = match action {
        PrefsAction::Show => return show_prefs(ctx, prefs),
        PrefsAction::SetKey { key } => {
            prefs.set_api_key(&key);
            "API key saved"
        }
        PrefsAction::SetModel { model } => {
            prefs.set_model_name(&model);
            "Model saved"
        }
        PrefsAction::Clear => {
            prefs.clear_api_config();
            "API configuration cleared"
        }
        PrefsAction::TourDone => {
            prefs.set_tour_completed(true);
            "Tour marked as completed"
        }
        PrefsAction::ClearHistory => {
            prefs.clear_recent_searches();
            "Search history cleared"
        }
    };
    prefs.save()?;
    eprintln!("{message} ({})", prefs.path().display());
    Ok(())
}

fn show_prefs(ctx: &Context, prefs: &PreferenceStore) -> anyhow::Result<()> {
    let key_state = if prefs.api_key().is_usable() { "stored" } else { "not set" };
    if ctx.json {
        return print_json(&serde_json::json!({
            "path": prefs.path(),
            "api_key": key_state,
            "model_name": prefs.model_name(),
            "tour_completed": prefs.tour_completed(),
            "recent_searches": prefs.recent_searches(),
        }));
    }
    println!("Preferences: {}", prefs.path().display());
    println!("  API key:        {key_state}");
    println!("  Model:          {}", prefs.model_name().unwrap_or("(from config)"));
    println!("  Tour completed: {}", prefs.tour_completed());
    if prefs.recent_searches().is_empty() {
        println!("  Recent searches: none");
    } else {
        println!("  Recent searches:");
        for q in prefs.recent_searches() {
            println!("    {q}");
        }
    }
    Ok(())
}

fn export_canvas(ctx: &Context, canvas: &MindMapCanvas, format: ImageFormat, title: &str) -> anyhow::Result<PathBuf> {
    let size = (ctx.config.mindmap.canvas_width, ctx.config.mindmap.canvas_height);
    let dir = ctx.exports_dir();
    let path = match format {
        ImageFormat::Svg => export::export_svg(canvas.map(), canvas.view(), size, &dir, title)?,
        ImageFormat::Png => {
            export::export_png(canvas.map(), canvas.view(), size, ctx.config.mindmap.png_width, &dir, title)?
        }
    };
    Ok(path)
}

/// Read either a bare analysis or an exported report.
fn read_analysis(path: &Path) -> anyhow::Result<AnalysisResult> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?;
    if let Some(inner) = value.get_mut("analysis").map(serde_json::Value::take) {
        value = inner;
    }
    let analysis: AnalysisResult = serde_json::from_value(value).context("not an analysis document")?;
    Ok(analysis.normalized())
}

fn current<T>(delivery: Delivery<T>) -> anyhow::Result<T> {
    delivery.into_current().context("result was superseded by a newer request")
}

fn nth(papers: &[PaperRecord], n: usize) -> anyhow::Result<&PaperRecord> {
    n.checked_sub(1)
        .and_then(|i| papers.get(i))
        .with_context(|| format!("no result #{n} (got {} results)", papers.len()))
}

fn flush_notices(session: &ResearchSession) {
    for notice in session.take_notices() {
        eprintln!("{notice}");
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_meta<T>(outcome: &QueryOutcome<T>) {
    println!("[{} | confidence {}]", outcome.mode_label(), as_percent(outcome.confidence()));
    if !outcome.sources().is_empty() {
        println!("Sources: {}", outcome.sources().join("; "));
    }
}

fn print_paper(n: usize, paper: &PaperRecord) {
    println!("{n}. {}", paper.title);
    println!("   {} | {} ({}) | {} citations", paper.authors.join(", "), paper.journal, paper.year, paper.citation_count);
    if let Some(doi) = &paper.doi {
        println!("   DOI: {doi}");
    }
    match &paper.pdf_url {
        Some(url) => println!("   PDF: {url}"),
        None => println!("   PDF: not available"),
    }
    println!();
}

fn print_analysis(outcome: &QueryOutcome<AnalysisResult>) {
    let a = outcome.value();
    println!("{}\n", a.title);
    if !a.summary.is_empty() {
        println!("{}\n", a.summary);
    }
    let sections: [(&str, Vec<String>); 5] = [
        ("Key Findings", a.key_findings.clone()),
        ("Methodology", a.methodology_items()),
        ("Conclusions", a.conclusion_items()),
        ("Research Gaps", a.research_gaps.clone()),
        ("Future Directions", a.future_directions.clone()),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("{heading}:");
        for item in items {
            println!("  - {item}");
        }
    }
    println!();
    print_meta(outcome);
}
