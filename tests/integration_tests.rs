use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::fs;
use ytranscript::{
    export_markdown, export_markdown_to_file, load_panel, render_markdown_export, CaptionFragment, CaptionSource, Document, ErrorKind,
    FetchOptions, FetchedTranscript, PanelRegistry, PanelSection, Result, StringDocument, TranscriptError,
    TranscriptFileSource, TranscriptSettings,
};

const URL: &str = "https://www.youtube.com/watch?v=5C_HPTJg5ek";

/// Caption source serving canned responses and recording call order
struct StaticSource {
    title: Option<String>,
    fragments: Option<Vec<CaptionFragment>>,
    calls: Mutex<Vec<String>>,
}

impl StaticSource {
    fn new(title: Option<&str>, fragments: Option<Vec<CaptionFragment>>) -> Self {
        Self {
            title: title.map(str::to_string),
            fragments,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptionSource for StaticSource {
    async fn fetch_transcript(&self, _url: &str, options: &FetchOptions) -> Result<FetchedTranscript> {
        self.calls.lock().unwrap().push(format!("transcript:{}/{}", options.lang, options.country));
        match &self.fragments {
            Some(fragments) => Ok(FetchedTranscript::new(self.title.clone(), fragments.clone())),
            None => Err(TranscriptError::Http { status: 503, url: URL.to_string() }),
        }
    }

    async fn fetch_title(&self, _url: &str, options: &FetchOptions) -> Result<String> {
        self.calls.lock().unwrap().push(format!("title:{}/{}", options.lang, options.country));
        self.title
            .clone()
            .ok_or_else(|| TranscriptError::Parse("no title".to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn sample_fragments() -> Vec<CaptionFragment> {
    vec![
        CaptionFragment::new("Hello", 0),
        CaptionFragment::new("world", 1000),
        CaptionFragment::new("foo", 2000),
        CaptionFragment::new("bar", 3000),
        CaptionFragment::new("baz", 4000),
    ]
}

fn settings(cadence: u32) -> TranscriptSettings {
    TranscriptSettings {
        timestamp_mod: cadence,
        ..TranscriptSettings::default()
    }
}

#[tokio::test]
async fn test_export_into_document_after_frontmatter() {
    let source = StaticSource::new(Some("Demo"), Some(sample_fragments()));
    let mut document = StringDocument::new("---\ntitle: x\n---\nbody", 5);

    let report = export_markdown(&source, &settings(2), URL, &mut document).await.unwrap();

    assert_eq!(report.offset, 17);
    assert_eq!(report.fragment_count, 5);
    assert_eq!(
        document.text(),
        format!(
            "---\ntitle: x\n---\n\n## Demo\n\n[Video Link]({})\n\n\
             **[0:00]** Hello world \n\n**[0:02]** foo bar \n\n**[0:04]** baz body",
            URL
        )
    );
    assert_eq!(source.calls(), vec!["transcript:en/EN"]);
}

#[tokio::test]
async fn test_export_at_cursor_without_frontmatter() {
    let source = StaticSource::new(None, Some(sample_fragments()));
    let mut document = StringDocument::new("0123456789 tail", 10);

    let report = export_markdown(&source, &settings(5), URL, &mut document).await.unwrap();

    assert_eq!(report.offset, 10);
    assert!(document.text().starts_with("0123456789## YouTube Transcript\n\n"));
    assert!(document.text().ends_with("baz \n\n tail"));
}

#[tokio::test]
async fn test_export_rejects_invalid_cadence_before_fetching() {
    let source = StaticSource::new(None, Some(sample_fragments()));
    let mut document = StringDocument::new("", 0);

    let err = export_markdown(&source, &settings(0), URL, &mut document).await.unwrap_err();

    assert!(matches!(err, TranscriptError::InvalidCadence(0)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(source.calls().is_empty());
    assert_eq!(document.text(), "");
}

#[tokio::test]
async fn test_export_rejects_empty_url() {
    let source = StaticSource::new(None, Some(sample_fragments()));
    let err = render_markdown_export(&source, &settings(5), "   ").await.unwrap_err();
    assert!(matches!(err, TranscriptError::InvalidUrl(_)));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_empty_transcript_is_no_captions() {
    let source = StaticSource::new(Some("Silent"), Some(Vec::new()));
    let err = render_markdown_export(&source, &settings(5), URL).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCaptions);
}

#[tokio::test]
async fn test_source_failure_is_source_unavailable() {
    let source = StaticSource::new(None, None);
    let err = render_markdown_export(&source, &settings(5), URL).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
}

#[tokio::test]
async fn test_panel_loads_title_then_transcript() {
    let source = StaticSource::new(Some("Demo"), Some(sample_fragments()));
    let mut settings = settings(2);
    settings.lang = "de".to_string();
    settings.country = "DE".to_string();

    let panel = load_panel(&source, &settings, URL).await;

    assert_eq!(source.calls(), vec!["title:de/DE", "transcript:de/DE"]);
    assert_eq!(panel.title, PanelSection::Ready("Demo".to_string()));

    let view = panel.transcript.ready().unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view.blocks[1].jump_url, format!("{}&t=2", URL));
    assert_eq!(view.blocks[2].quote_text, "baz");
    assert_eq!(view.copy_all_text(), "Hello world foo bar baz");
}

#[tokio::test]
async fn test_panel_title_failure_does_not_block_transcript() {
    let source = StaticSource::new(None, Some(sample_fragments()));
    let panel = load_panel(&source, &settings(5), URL).await;

    assert!(!panel.title.is_ready());
    assert!(panel.transcript.is_ready());
}

#[tokio::test]
async fn test_panel_transcript_failure_keeps_title() {
    let source = StaticSource::new(Some("Demo"), None);
    let panel = load_panel(&source, &settings(5), URL).await;

    assert_eq!(panel.title, PanelSection::Ready("Demo".to_string()));
    match panel.transcript {
        PanelSection::Failed(message) => assert!(message.contains("503")),
        PanelSection::Ready(_) => panic!("transcript should have failed"),
    }

    let empty = StaticSource::new(Some("Demo"), Some(Vec::new()));
    let panel = load_panel(&empty, &settings(5), URL).await;
    assert!(matches!(panel.transcript, PanelSection::Failed(ref m) if m.starts_with("No transcript found")));
}

#[tokio::test]
async fn test_panel_coerces_zero_cadence() {
    let source = StaticSource::new(Some("Demo"), Some(sample_fragments()));
    let panel = load_panel(&source, &settings(0), URL).await;
    assert_eq!(panel.transcript.ready().unwrap().len(), 1);
}

#[tokio::test]
async fn test_registry_tracks_panels_independently() {
    let source = StaticSource::new(Some("Demo"), Some(sample_fragments()));
    let mut registry = PanelRegistry::new();
    let first = registry.open(URL);
    let second = registry.open("https://youtu.be/aaaaaaaaaaa");

    registry.close(first);
    let url = registry.url(second).unwrap().to_string();
    let panel = load_panel(&source, &settings(5), &url).await;

    assert_eq!(panel.url, "https://youtu.be/aaaaaaaaaaa");
    assert_eq!(registry.entries().len(), 1);
}

#[tokio::test]
async fn test_file_source_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("captions.json");
    fs::write(
        &path,
        r#"[{"text":"first line","start":0.0,"duration":2.0},
            {"text":"second line","start":62.4,"duration":2.0},
            {"text":"third line","start":3725.9,"duration":2.0}]"#,
    )
    .await
    .unwrap();

    let source = TranscriptFileSource::new(&path);
    let export = render_markdown_export(&source, &settings(1), URL).await.unwrap();

    assert!(export.markdown.contains("**[0:00]** first line \n\n"));
    assert!(export.markdown.contains("**[1:02]** second line \n\n"));
    assert!(export.markdown.contains("**[1:02:05]** third line \n\n"));
    assert_eq!(export.fragment_count, 3);
}

#[tokio::test]
async fn test_file_insert_keeps_unreadable_document_intact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notes.md");
    let original = b"caf\xe9 notes keep me\n".to_vec();
    fs::write(&path, &original).await.unwrap();

    let source = StaticSource::new(None, Some(sample_fragments()));
    let err = export_markdown_to_file(&source, &settings(5), URL, &path, None)
        .await
        .unwrap_err();

    assert!(matches!(err, TranscriptError::DocumentRead { .. }));
    assert!(source.calls().is_empty());
    assert_eq!(fs::read(&path).await.unwrap(), original);
}

#[tokio::test]
async fn test_file_insert_appends_and_creates() {
    let temp_dir = TempDir::new().unwrap();
    let source = StaticSource::new(Some("Demo"), Some(sample_fragments()));

    let existing = temp_dir.path().join("existing.md");
    fs::write(&existing, "# Notes\n").await.unwrap();
    let report = export_markdown_to_file(&source, &settings(5), URL, &existing, None)
        .await
        .unwrap();
    assert_eq!(report.offset, 8);
    let text = fs::read_to_string(&existing).await.unwrap();
    assert!(text.starts_with("# Notes\n## Demo\n\n"));

    let created = temp_dir.path().join("created.md");
    export_markdown_to_file(&source, &settings(5), URL, &created, Some(40))
        .await
        .unwrap();
    let text = fs::read_to_string(&created).await.unwrap();
    assert!(text.starts_with("## Demo\n\n[Video Link]("));
}
