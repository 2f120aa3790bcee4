//! One interactive research session.
//!
//! Each result slot (answer, gene report, search page, analysis) keeps only
//! the outcome of the most recently *issued* request. Tickets are taken
//! synchronously when a query is started, so a slow request that resolves
//! after a newer one is dropped instead of overwriting it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use genelinker_common::sandbox::SandboxClient;
use genelinker_common::{
    require_input, AnalysisResult, GeneReport, PaperRecord, Persona, QueryOutcome, Result, SearchPage,
};
use genelinker_config::Config;
use genelinker_literature::{CoreClient, LiteratureService};
use genelinker_llm::{OpenAiCompatibleBackend, ResearchAssistant};
use genelinker_mindmap::MindMapCanvas;

use crate::notice::Notice;

/// Position of a request in its slot's issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn number(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket counter. The first ticket is 1; 0 means nothing issued.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub const fn new() -> Self {
        Self { issued: AtomicU64::new(0) }
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest()
    }
}

/// A value slot that only accepts the newest issued request's result.
#[derive(Debug)]
pub struct LatestSlot<T> {
    sequencer: RequestSequencer,
    state: Mutex<SlotState<T>>,
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<(Ticket, T)>,
    /// Highest ticket that committed, was discarded or was abandoned.
    settled: u64,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            state: Mutex::new(SlotState { value: None, settled: 0 }),
        }
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        self.sequencer.issue()
    }

    /// Issue a ticket wrapped in a guard that settles it when dropped, so a
    /// request that is abandoned or fails does not leave the slot pending.
    pub fn begin(&self) -> InFlight<'_, T> {
        InFlight { slot: self, ticket: self.issue() }
    }

    /// Store `value` if `ticket` is still the newest issued. Returns whether
    /// it was stored.
    pub fn commit(&self, ticket: Ticket, value: T) -> bool {
        self.commit_with(ticket, value, |_| {})
    }

    /// Like [`commit`](Self::commit), running `on_commit` under the slot lock
    /// so side effects keep the same order as the stored values.
    pub fn commit_with(&self, ticket: Ticket, value: T, on_commit: impl FnOnce(&T)) -> bool {
        let mut state = lock(&self.state);
        state.settled = state.settled.max(ticket.0);
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.sequencer.latest(), "stale result discarded");
            return false;
        }
        on_commit(&value);
        state.value = Some((ticket, value));
        true
    }

    /// Give up on `ticket` without a result. The stored value is untouched.
    pub fn cancel(&self, ticket: Ticket) {
        let mut state = lock(&self.state);
        if ticket.0 > state.settled {
            state.settled = ticket.0;
            tracing::debug!(ticket = ticket.0, "request abandoned");
        }
    }

    /// True while the newest issued request has neither committed nor been
    /// cancelled.
    pub fn is_pending(&self) -> bool {
        let settled = lock(&self.state).settled;
        self.sequencer.latest() > settled
    }

    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let state = lock(&self.state);
        f(state.value.as_ref().map(|(_, v)| v))
    }
}

/// An issued ticket that is cancelled on drop unless it already settled.
#[derive(Debug)]
pub struct InFlight<'a, T> {
    slot: &'a LatestSlot<T>,
    ticket: Ticket,
}

impl<T> InFlight<'_, T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn commit_with(self, value: T, on_commit: impl FnOnce(&T)) -> bool {
        self.slot.commit_with(self.ticket, value, on_commit)
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        self.slot.cancel(self.ticket);
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn get(&self) -> Option<T> {
        self.with(|v| v.cloned())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What happened to a finished request.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<T> {
    /// Stored as the slot's current value.
    Current(T),
    /// A newer request was issued first; the result was dropped.
    Superseded,
}

impl<T> Delivery<T> {
    pub fn is_current(&self) -> bool {
        matches!(self, Delivery::Current(_))
    }

    pub fn into_current(self) -> Option<T> {
        match self {
            Delivery::Current(v) => Some(v),
            Delivery::Superseded => None,
        }
    }
}

pub type Pending<T> = Result<Delivery<QueryOutcome<T>>>;

pub struct ResearchSession {
    assistant: ResearchAssistant,
    literature: LiteratureService,
    answer: LatestSlot<QueryOutcome<String>>,
    gene: LatestSlot<QueryOutcome<GeneReport>>,
    search: LatestSlot<QueryOutcome<SearchPage>>,
    analysis: LatestSlot<QueryOutcome<AnalysisResult>>,
    canvas: Mutex<Option<MindMapCanvas>>,
    notices: Mutex<Vec<Notice>>,
}

impl ResearchSession {
    pub fn new(assistant: ResearchAssistant, literature: LiteratureService) -> Self {
        Self {
            assistant,
            literature,
            answer: LatestSlot::new(),
            gene: LatestSlot::new(),
            search: LatestSlot::new(),
            analysis: LatestSlot::new(),
            canvas: Mutex::new(None),
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Wire the HTTP backends described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = SandboxClient::with_timeout(config.timeout())?;
        for domain in &config.http.extra_allowed_domains {
            client.allow_domain(domain);
        }
        let backend = OpenAiCompatibleBackend::from_config(config, client.clone());
        if !backend.has_credential() {
            tracing::warn!("no LLM credential configured; answers will come from the offline fallback");
        }
        let assistant = ResearchAssistant::new(Arc::new(backend)).with_persona(config.llm.persona);
        let literature = LiteratureService::new(Arc::new(CoreClient::from_config(config, client)))
            .with_default_limit(config.literature.default_limit);
        Ok(Self::new(assistant, literature))
    }

    pub fn persona(&self) -> Persona {
        self.assistant.persona()
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.assistant.set_persona(persona);
    }

    /// Start a question. Blank input fails here, before any ticket or request.
    pub fn ask(&self, question: &str) -> Result<impl Future<Output = Pending<String>> + '_> {
        let question = require_input("question", question)?.to_string();
        let flight = self.answer.begin();
        Ok(async move {
            let outcome = self.assistant.ask(&question).await?;
            Ok(self.deliver(flight, "Answer", outcome, |_| {}))
        })
    }

    pub fn link_gene(&self, gene_id: &str) -> Result<impl Future<Output = Pending<GeneReport>> + '_> {
        let gene_id = require_input("gene id", gene_id)?.to_string();
        let flight = self.gene.begin();
        Ok(async move {
            let outcome = self.assistant.link_gene(&gene_id).await?;
            Ok(self.deliver(flight, "Gene report", outcome, |_| {}))
        })
    }

    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<impl Future<Output = Pending<SearchPage>> + '_> {
        let query = require_input("search query", query)?.to_string();
        let flight = self.search.begin();
        Ok(async move {
            let outcome = self.literature.search(&query, limit).await?;
            Ok(self.deliver(flight, "Search", outcome, |_| {}))
        })
    }

    /// Analyze paper text. A committed analysis also replaces the mind map.
    pub fn analyze(&self, title: &str, text: &str) -> Result<impl Future<Output = Pending<AnalysisResult>> + '_> {
        let text = require_input("paper content", text)?.to_string();
        let title = title.trim().to_string();
        let flight = self.analysis.begin();
        Ok(async move {
            let outcome = self.assistant.analyze_paper(&title, &text).await?;
            Ok(self.deliver(flight, "Analysis", outcome, |o: &QueryOutcome<AnalysisResult>| {
                self.show_mind_map(o.value())
            }))
        })
    }

    /// Analyze a search hit from its bibliographic record.
    pub fn analyze_record(&self, paper: &PaperRecord) -> Result<impl Future<Output = Pending<AnalysisResult>> + '_> {
        self.analyze(&paper.title, &paper.as_prompt_text())
    }

    pub fn answer(&self) -> Option<QueryOutcome<String>> {
        self.answer.get()
    }

    pub fn gene_report(&self) -> Option<QueryOutcome<GeneReport>> {
        self.gene.get()
    }

    pub fn search_results(&self) -> Option<QueryOutcome<SearchPage>> {
        self.search.get()
    }

    pub fn analysis(&self) -> Option<QueryOutcome<AnalysisResult>> {
        self.analysis.get()
    }

    pub fn is_busy(&self) -> bool {
        self.answer.is_pending() || self.gene.is_pending() || self.search.is_pending() || self.analysis.is_pending()
    }

    /// Run `f` on the mind-map canvas, if an analysis has been shown.
    pub fn with_canvas<R>(&self, f: impl FnOnce(&mut MindMapCanvas) -> R) -> Option<R> {
        lock(&self.canvas).as_mut().map(f)
    }

    /// Drain notices raised since the last call.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *lock(&self.notices))
    }

    fn show_mind_map(&self, analysis: &AnalysisResult) {
        let mut canvas = lock(&self.canvas);
        match canvas.as_mut() {
            Some(c) => c.set_analysis(analysis),
            None => *canvas = Some(MindMapCanvas::new(analysis)),
        }
    }

    fn deliver<T: Clone>(
        &self,
        flight: InFlight<'_, QueryOutcome<T>>,
        what: &str,
        outcome: QueryOutcome<T>,
        on_commit: impl FnOnce(&QueryOutcome<T>),
    ) -> Delivery<QueryOutcome<T>> {
        if !flight.commit_with(outcome.clone(), on_commit) {
            return Delivery::Superseded;
        }
        let notice = Notice::for_outcome(what, &outcome);
        notice.log();
        lock(&self.notices).push(notice);
        Delivery::Current(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genelinker_common::FallbackReason;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tickets_increase() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), 0);
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(b.number(), 2);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[test]
    fn test_out_of_order_commit_keeps_newest() {
        let slot = LatestSlot::new();
        let a = slot.issue();
        let b = slot.issue();
        assert!(slot.is_pending());
        assert!(slot.commit(b, "B"));
        assert!(!slot.commit(a, "A"));
        assert_eq!(slot.get(), Some("B"));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_in_order_commit_is_superseded_by_newer_issue() {
        let slot = LatestSlot::new();
        let a = slot.issue();
        let _b = slot.issue();
        assert!(!slot.commit(a, 1));
        assert_eq!(slot.get(), None);
        assert!(slot.is_pending());
    }

    #[test]
    fn test_on_commit_only_runs_for_current() {
        let slot = LatestSlot::new();
        let a = slot.issue();
        let b = slot.issue();
        let mut seen = Vec::new();
        slot.commit_with(a, 'a', |v| seen.push(*v));
        slot.commit_with(b, 'b', |v| seen.push(*v));
        assert_eq!(seen, vec!['b']);
    }

    #[test]
    fn test_dropped_flight_clears_pending() {
        let slot = LatestSlot::<u8>::new();
        let flight = slot.begin();
        assert!(slot.is_pending());
        drop(flight);
        assert!(!slot.is_pending());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_cancelling_older_ticket_keeps_newer_pending() {
        let slot = LatestSlot::new();
        let a = slot.begin();
        let b = slot.begin();
        drop(a);
        assert!(slot.is_pending());
        assert!(b.commit_with(7, |_| {}));
        assert!(!slot.is_pending());
        assert_eq!(slot.get(), Some(7));
    }

    #[test]
    fn test_cancel_after_commit_keeps_value() {
        let slot = LatestSlot::new();
        let a = slot.issue();
        assert!(slot.commit(a, "kept"));
        slot.cancel(a);
        assert_eq!(slot.get(), Some("kept"));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_delivery_helpers() {
        let d: Delivery<u8> = Delivery::Current(3);
        assert!(d.is_current());
        assert_eq!(d.into_current(), Some(3));
        assert_eq!(Delivery::<u8>::Superseded.into_current(), None);
    }

    #[tokio::test]
    async fn test_offline_session_from_default_config() {
        // Placeholder endpoints with no credentials never leave the process.
        let session = ResearchSession::from_config(&Config::default()).unwrap();
        let delivery = session.ask("How do proteins fold?").unwrap().await.unwrap();
        let outcome = delivery.into_current().unwrap();
        assert_eq!(outcome.reason(), Some(&FallbackReason::MissingCredential));
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(session.take_notices().is_empty());
    }
}
