//! Include-stack integration tests: nesting, deduplication, pass rewinds
//! and error cleanup.

use dbasic_diagnostics::messages::EXPECTING_TOKEN;
use dbasic_diagnostics::CollectSink;
use dbasic_options::ScanOptions;
use dbasic_scanner::{
    FileSource, IncludeResolver, IncludeStatus, LineReader, MemoryResolver, ParseContext,
    SearchPathResolver, StringSource, TokenKind,
};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// A resolver that counts how often a file is actually opened.
struct CountingResolver {
    inner: MemoryResolver,
    opens: Rc<Cell<usize>>,
}

impl IncludeResolver for CountingResolver {
    fn open_in_path(&self, name: &str) -> Option<Box<dyn LineReader>> {
        let reader = self.inner.open_in_path(name)?;
        self.opens.set(self.opens.get() + 1);
        Some(reader)
    }
}

const MAIN: &str = "MAIN1\nMAIN2\nMAIN3\n";

fn library() -> MemoryResolver {
    MemoryResolver::new()
        .with_file("lib.bas", "LIB1\nLIB2\n")
        .with_file("outer.bas", "OUTER1\nOUTER2\n")
        .with_file("inner.bas", "INNER1\n")
        .with_file("broken.bas", "PRINT \"oops\n")
}

fn context(main: &str) -> (ParseContext, CollectSink) {
    let sink = CollectSink::new();
    let ctx = ParseContext::new(StringSource::new(main), ScanOptions::default())
        .with_resolver(library())
        .with_sink(sink.clone());
    (ctx, sink)
}

fn counting_context(main: &str) -> (ParseContext, Rc<Cell<usize>>) {
    let opens = Rc::new(Cell::new(0));
    let resolver = CountingResolver {
        inner: library(),
        opens: Rc::clone(&opens),
    };
    let ctx = ParseContext::new(StringSource::new(main), ScanOptions::default())
        .with_resolver(resolver)
        .with_sink(CollectSink::new());
    (ctx, opens)
}

/// The first word of the current line.
fn first_word(ctx: &mut ParseContext) -> String {
    ctx.get_token().unwrap().text
}

#[test]
fn test_include_resumes_enclosing_line_counter() {
    let (mut ctx, _) = context(MAIN);
    assert!(ctx.get_line().unwrap());
    assert_eq!(ctx.line_number(), 1);
    assert_eq!(ctx.push_include("lib.bas"), IncludeStatus::Opened);
    assert_eq!(ctx.include_depth(), 1);

    assert!(ctx.get_line().unwrap());
    assert_eq!(first_word(&mut ctx), "LIB1");
    assert_eq!(ctx.line_number(), 1);
    assert!(ctx.get_line().unwrap());
    assert_eq!(first_word(&mut ctx), "LIB2");
    assert_eq!(ctx.line_number(), 2);

    assert!(ctx.get_line().unwrap());
    assert_eq!(ctx.include_depth(), 0);
    assert_eq!(first_word(&mut ctx), "MAIN2");
    assert_eq!(ctx.line_number(), 2);
}

#[test]
fn test_nested_includes() {
    let (mut ctx, _) = context(MAIN);
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("outer.bas"), IncludeStatus::Opened);
    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "OUTER1");
    assert_eq!(ctx.push_include("inner.bas"), IncludeStatus::Opened);
    assert_eq!(ctx.include_depth(), 2);

    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "INNER1");
    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "OUTER2");
    assert_eq!(ctx.line_number(), 2);
    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "MAIN2");
    assert_eq!(
        ctx.included_files().collect::<Vec<_>>(),
        vec!["outer.bas", "inner.bas"]
    );
}

#[test]
fn test_stacked_empty_includes_unwind_in_one_fetch() {
    let resolver = (0..2_000).fold(MemoryResolver::new(), |resolver, i| {
        resolver.with_file(format!("empty{}.bas", i), "")
    });
    let mut ctx = ParseContext::new(StringSource::new("A\nB\n"), ScanOptions::default())
        .with_resolver(resolver)
        .with_sink(CollectSink::new());
    ctx.get_line().unwrap();
    for i in 0..2_000 {
        assert_eq!(ctx.push_include(&format!("empty{}.bas", i)), IncludeStatus::Opened);
    }
    assert_eq!(ctx.include_depth(), 2_000);

    assert!(ctx.get_line().unwrap());
    assert_eq!(ctx.include_depth(), 0);
    assert_eq!(ctx.line_number(), 2);
    assert_eq!(first_word(&mut ctx), "B");
}

#[test]
fn test_include_is_read_once_per_pass() {
    let (mut ctx, opens) = counting_context(MAIN);
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("lib.bas"), IncludeStatus::Opened);
    assert_eq!(ctx.push_include("lib.bas"), IncludeStatus::AlreadySatisfied);
    assert_eq!(opens.get(), 1);
    assert_eq!(ctx.include_depth(), 1);

    // Still satisfied after the file has been read to the end.
    while ctx.include_depth() > 0 {
        ctx.get_line().unwrap();
    }
    assert_eq!(ctx.push_include("lib.bas"), IncludeStatus::AlreadySatisfied);
    assert_eq!(opens.get(), 1);
}

#[test]
fn test_missing_include_is_registered() {
    let (mut ctx, _) = context(MAIN);
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("missing.bas"), IncludeStatus::NotFound);
    assert_eq!(ctx.include_depth(), 0);
    assert_eq!(ctx.push_include("missing.bas"), IncludeStatus::AlreadySatisfied);
    assert_eq!(ctx.included_files().collect::<Vec<_>>(), vec!["missing.bas"]);
}

#[test]
fn test_lookahead_cleared_at_include_boundary() {
    let (mut ctx, _) = context(MAIN);
    ctx.get_line().unwrap();
    ctx.push_include("inner.bas");
    ctx.get_line().unwrap();
    let token = ctx.get_token().unwrap();
    ctx.save_token(token);
    assert!(ctx.get_line().unwrap());
    assert!(ctx.saved_token().is_none());
    assert_eq!(first_word(&mut ctx), "MAIN2");
}

#[test]
fn test_rewind_resets_registry_and_counters() {
    let (mut ctx, opens) = counting_context(MAIN);
    ctx.get_line().unwrap();
    ctx.push_include("lib.bas");
    ctx.get_line().unwrap();

    ctx.rewind_for_new_pass().unwrap();
    assert_eq!(ctx.include_depth(), 0);
    assert_eq!(ctx.included_files().count(), 0);
    assert_eq!(ctx.line_number(), 0);
    assert!(ctx.line_text().is_empty());

    ctx.get_line().unwrap();
    assert_eq!(ctx.line_number(), 1);
    assert_eq!(first_word(&mut ctx), "MAIN1");
    assert_eq!(ctx.push_include("lib.bas"), IncludeStatus::Opened);
    assert_eq!(opens.get(), 2);
}

#[test]
fn test_passes_see_the_same_tokens() {
    let (mut ctx, _) = context("DIM A\nPRINT A\n");
    let first = ctx.run_pass(|ctx| ctx.scan_all()).unwrap();
    let second = ctx.run_pass(|ctx| ctx.scan_all()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn test_failed_pass_closes_includes() {
    let (mut ctx, sink) = context(MAIN);
    let result: Result<(), _> = ctx.run_pass(|ctx| {
        ctx.get_line()?;
        ctx.push_include("outer.bas");
        ctx.get_line()?;
        ctx.push_include("inner.bas");
        ctx.get_line()?;
        Err(ctx.error(&EXPECTING_TOKEN, &["THEN", "<EOL>"]))
    });
    let err = result.unwrap_err();
    assert_eq!(err.code(), 1005);
    assert_eq!(ctx.include_depth(), 0);
    assert!(sink.contents().contains("  file 'inner.bas', line 1\n"));
}

#[test]
fn test_error_inside_include_names_the_file() {
    let (mut ctx, sink) = context(MAIN);
    ctx.get_line().unwrap();
    ctx.push_include("broken.bas");
    ctx.get_line().unwrap();
    ctx.get_token().unwrap();
    let err = ctx.get_token().unwrap_err();

    let position = err.diagnostic().position.clone().unwrap();
    assert_eq!(position.file.as_deref(), Some("broken.bas"));
    assert_eq!(position.line, 1);
    assert_eq!(ctx.include_depth(), 0);
    assert_eq!(
        sink.contents(),
        "error: unterminated string\n  file 'broken.bas', line 1\n    PRINT \"oops\n          ^\n"
    );
}

#[test]
fn test_fetch_and_require_across_include_statement() {
    let (mut ctx, _) = context("INCLUDE \"lib.bas\"\nMAIN2\n");
    ctx.get_line().unwrap();
    ctx.fetch_and_require(TokenKind::Keyword(dbasic_scanner::Keyword::Include))
        .unwrap();
    let name = ctx.fetch_and_require(TokenKind::String).unwrap();
    ctx.fetch_and_require(TokenKind::Eol).unwrap();
    assert_eq!(ctx.push_include(&name.text), IncludeStatus::Opened);

    let words: Vec<String> = ctx
        .scan_all()
        .unwrap()
        .into_iter()
        .filter(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.text)
        .collect();
    assert_eq!(words, vec!["LIB1", "LIB2", "MAIN2"]);
}

/// A scratch directory removed when dropped.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("dbasic_{}_{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn test_search_path_include_from_disk() {
    let scratch = ScratchDir::new("search");
    fs::write(scratch.0.join("disk.bas"), "FROM_DISK\n").unwrap();

    let dir = scratch.0.to_string_lossy().into_owned();
    let mut ctx = ParseContext::new(StringSource::new(MAIN), ScanOptions::default())
        .with_resolver(SearchPathResolver::new(vec![dir]))
        .with_sink(CollectSink::new());
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("disk.bas"), IncludeStatus::Opened);
    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "FROM_DISK");
    assert_eq!(ctx.push_include("nowhere.bas"), IncludeStatus::NotFound);
}

#[test]
fn test_backslash_include_name_resolves() {
    let scratch = ScratchDir::new("backslash");
    fs::create_dir_all(scratch.0.join("sub")).unwrap();
    fs::write(scratch.0.join("sub").join("nested.bas"), "NESTED\n").unwrap();

    let dir = scratch.0.to_string_lossy().into_owned();
    let mut ctx = ParseContext::new(StringSource::new(MAIN), ScanOptions::default())
        .with_resolver(SearchPathResolver::new(vec![dir]))
        .with_sink(CollectSink::new());
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("sub\\nested.bas"), IncludeStatus::Opened);
    ctx.get_line().unwrap();
    assert_eq!(first_word(&mut ctx), "NESTED");
}

#[test]
fn test_include_paths_from_options() {
    let scratch = ScratchDir::new("options");
    fs::write(scratch.0.join("opt.bas"), "OPT\n").unwrap();

    let options = ScanOptions::default().with_include_path(scratch.0.to_string_lossy());
    let mut ctx = ParseContext::new(StringSource::new(MAIN), options).with_sink(CollectSink::new());
    ctx.get_line().unwrap();
    assert_eq!(ctx.push_include("opt.bas"), IncludeStatus::Opened);
}

#[test]
fn test_file_source_rewinds_between_passes() {
    let scratch = ScratchDir::new("primary");
    let path = scratch.0.join("main.bas");
    fs::write(&path, "FOR I = 1 TO 0x10\nNEXT I\n").unwrap();

    let source = FileSource::open(&path).unwrap();
    assert_eq!(source.path(), path.as_path());
    let mut ctx = ParseContext::new(source, ScanOptions::default()).with_sink(CollectSink::new());
    let first = ctx.run_pass(|ctx| ctx.scan_all()).unwrap();
    let second = ctx.run_pass(|ctx| ctx.scan_all()).unwrap();
    assert_eq!(first.len(), 11);
    assert_eq!(first, second);
    assert_eq!(first[5].value, 16);
}
