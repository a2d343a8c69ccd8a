//! Preprocessor evaluator: include resolution, macro indexing and
//! conditional tracking.
//!
//! The scanner acts only on directive lines (lines whose first non-whitespace
//! token is `#`). It never expands macros into the surrounding token stream;
//! it records definitions and evaluates conditions so that directives and
//! includes inside disabled regions are ignored.

use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    error::{MAX_CONDITIONAL_DEPTH, ParseError},
    ppexpr,
    token::{Token, TokenKind},
    tokenizer::tokenize,
};

/// One recorded `#define`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    /// The macro name.
    pub name: String,
    /// Parameter names for a function-like macro; `None` for object-like.
    pub params: Option<Vec<String>>,
    /// Whether the parameter list ends in `...`.
    pub variadic: bool,
    /// The replacement text, trimmed, possibly empty.
    pub replacement: String,
}

/// An append-only macro index.
///
/// Duplicate definitions append silently; lookup returns the first match,
/// mirroring a forward scan of the table.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    defs: Vec<MacroDef>,
}

impl MacroTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a definition.
    pub fn define(&mut self, def: MacroDef) {
        self.defs.push(def);
    }

    /// Defines an object-like macro from name and replacement text.
    pub fn define_object(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        self.define(MacroDef {
            name: name.into(),
            params: None,
            variadic: false,
            replacement: replacement.into(),
        });
    }

    /// Removes every definition of `name`.
    pub fn undefine(&mut self, name: &str) {
        self.defs.retain(|d| d.name != name);
    }

    /// The first definition of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&MacroDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Whether `name` has at least one definition.
    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The number of recorded definitions, duplicates included.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True when no definition was recorded.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Explicit scanning context: search paths and the macro index. There is no
/// global state; callers own and thread the context.
#[derive(Debug, Clone, Default)]
pub struct PreprocContext {
    /// Directories searched for includes, in order.
    pub search_paths: Vec<PathBuf>,
    /// The macro index.
    pub macros: MacroTable,
}

impl PreprocContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the given search paths.
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            macros: MacroTable::new(),
        }
    }

    /// Resolves an include spelling to an existing file.
    ///
    /// The quoted form searches the including file's directory first, then
    /// the configured search paths; the angled form searches only the
    /// configured paths. First hit wins.
    pub fn resolve_include(
        &self,
        spelled: &str,
        angled: bool,
        current_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        if !angled
            && let Some(dir) = current_dir
        {
            let candidate = dir.join(spelled);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        for dir in &self.search_paths {
            let candidate = dir.join(spelled);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// An include directive that resolved to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    /// The spelling between the delimiters.
    pub spelled: String,
    /// The resolved path.
    pub resolved: PathBuf,
    /// Whether the angled form was used.
    pub angled: bool,
}

#[derive(Debug, Clone, Copy)]
struct CondState {
    active: bool,
    satisfied: bool,
    else_seen: bool,
    parent_active: bool,
}

/// Reads and scans one file. See [`scan_source`].
pub fn scan_file(
    ctx: &mut PreprocContext,
    path: &Path,
    visit: &mut dyn FnMut(&ResolvedInclude) -> ControlFlow<()>,
) -> Result<(), ParseError> {
    let source = std::fs::read_to_string(path)?;
    scan_source(ctx, &source, path.parent(), visit)
}

/// Scans one source buffer, acting only on directive lines.
///
/// For each resolved include the visitor is invoked; `ControlFlow::Break`
/// stops the scan early. Directives inside disabled conditional regions are
/// ignored.
pub fn scan_source(
    ctx: &mut PreprocContext,
    source: &str,
    current_dir: Option<&Path>,
    visit: &mut dyn FnMut(&ResolvedInclude) -> ControlFlow<()>,
) -> Result<(), ParseError> {
    let list = tokenize(source);
    let tokens = list.tokens();
    let mut stack: Vec<CondState> = Vec::new();
    let mut idx = 0;
    let mut line_start = true;

    while idx < tokens.len() {
        let token = &tokens[idx];
        match token.kind {
            TokenKind::Whitespace => {
                if list.newline_count(token) > 0 {
                    line_start = true;
                }
                idx += 1;
            }
            TokenKind::Hash if line_start => {
                // The directive extends to the next newline byte in the
                // source, honoring backslash continuations. Token kinds are
                // deliberately not consulted for the line end.
                let line_end = directive_line_end(source, token.end());
                let mut end_idx = idx + 1;
                while end_idx < tokens.len() && tokens[end_idx].end() <= line_end {
                    end_idx += 1;
                }
                let line = &tokens[idx + 1..end_idx];
                let flow = handle_directive(
                    ctx,
                    source,
                    current_dir,
                    line,
                    &mut stack,
                    visit,
                )?;
                if flow.is_break() {
                    return Ok(());
                }
                idx = end_idx;
                line_start = false;
            }
            _ => {
                line_start = false;
                idx += 1;
            }
        }
    }

    if !stack.is_empty() {
        warn!(depth = stack.len(), "unterminated conditional at end of file");
    }
    Ok(())
}

/// Finds the byte offset of the newline ending a directive line, skipping
/// backslash-continued newlines.
fn directive_line_end(source: &str, from: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        if bytes[pos] == b'\n' {
            let mut back = pos;
            while back > from && matches!(bytes[back - 1], b'\r' | b' ' | b'\t') {
                back -= 1;
            }
            if back > from && bytes[back - 1] == b'\\' {
                pos += 1;
                continue;
            }
            return pos;
        }
        pos += 1;
    }
    bytes.len()
}

fn enabled(stack: &[CondState]) -> bool {
    stack.iter().all(|state| state.active)
}

fn handle_directive(
    ctx: &mut PreprocContext,
    source: &str,
    current_dir: Option<&Path>,
    line: &[Token],
    stack: &mut Vec<CondState>,
    visit: &mut dyn FnMut(&ResolvedInclude) -> ControlFlow<()>,
) -> Result<ControlFlow<()>, ParseError> {
    let mut cursor = Cursor::new(line);
    let Some(name) = cursor.next_significant() else {
        // A lone `#` is a null directive.
        return Ok(ControlFlow::Continue(()));
    };

    match name.text(source) {
        "include" => {
            if enabled(stack)
                && let Some(include) = parse_include(ctx, source, current_dir, &mut cursor)
                && visit(&include).is_break()
            {
                return Ok(ControlFlow::Break(()));
            }
        }
        "define" => {
            if enabled(stack) {
                parse_define(ctx, source, &mut cursor);
            }
        }
        "undef" => {
            if enabled(stack)
                && let Some(token) = cursor.next_significant()
            {
                ctx.macros.undefine(token.text(source));
            }
        }
        "if" => {
            push_conditional(stack, |parent_active| {
                parent_active && eval_rest(ctx, source, current_dir, &cursor)
            })?;
        }
        "ifdef" => {
            let defined = cursor
                .next_significant()
                .is_some_and(|t| ctx.macros.is_defined(t.text(source)));
            push_conditional(stack, |parent_active| parent_active && defined)?;
        }
        "ifndef" => {
            let defined = cursor
                .next_significant()
                .is_some_and(|t| ctx.macros.is_defined(t.text(source)));
            push_conditional(stack, |parent_active| parent_active && !defined)?;
        }
        "elif" => {
            if let Some(top) = stack.last_mut() {
                if top.else_seen {
                    warn!("#elif after #else; ignoring");
                } else if top.parent_active && !top.satisfied {
                    top.active = eval_rest(ctx, source, current_dir, &cursor);
                    top.satisfied |= top.active;
                } else {
                    top.active = false;
                }
            } else {
                warn!("#elif without matching #if; ignoring");
            }
        }
        "elifdef" | "elifndef" => {
            let negate = name.text(source) == "elifndef";
            let defined = cursor
                .next_significant()
                .is_some_and(|t| ctx.macros.is_defined(t.text(source)));
            if let Some(top) = stack.last_mut() {
                if top.else_seen {
                    warn!("#elifdef after #else; ignoring");
                } else if top.parent_active && !top.satisfied {
                    top.active = defined != negate;
                    top.satisfied |= top.active;
                } else {
                    top.active = false;
                }
            } else {
                warn!("#elifdef without matching #if; ignoring");
            }
        }
        "else" => {
            if let Some(top) = stack.last_mut() {
                if top.else_seen {
                    warn!("duplicate #else; ignoring");
                } else {
                    top.else_seen = true;
                    top.active = top.parent_active && !top.satisfied;
                    top.satisfied = true;
                }
            } else {
                warn!("#else without matching #if; ignoring");
            }
        }
        "endif" => {
            if stack.pop().is_none() {
                warn!("#endif without matching #if; ignoring");
            }
        }
        other => {
            debug!(directive = other, "ignoring directive");
        }
    }
    Ok(ControlFlow::Continue(()))
}

fn push_conditional(
    stack: &mut Vec<CondState>,
    condition: impl FnOnce(bool) -> bool,
) -> Result<(), ParseError> {
    if stack.len() >= MAX_CONDITIONAL_DEPTH {
        return Err(ParseError::DepthExceeded);
    }
    let parent_active = enabled(stack);
    let active = condition(parent_active);
    stack.push(CondState {
        active,
        satisfied: active,
        else_seen: false,
        parent_active,
    });
    Ok(())
}

fn eval_rest(
    ctx: &PreprocContext,
    source: &str,
    current_dir: Option<&Path>,
    cursor: &Cursor<'_>,
) -> bool {
    let rest = cursor.rest();
    let outcome = ppexpr::evaluate(rest, source, ctx, current_dir);
    if outcome.error {
        warn!("malformed conditional expression; treating as false");
    }
    outcome.value != 0
}

fn parse_include(
    ctx: &PreprocContext,
    source: &str,
    current_dir: Option<&Path>,
    cursor: &mut Cursor<'_>,
) -> Option<ResolvedInclude> {
    let token = cursor.next_significant()?;
    let (spelled, angled) = match token.kind {
        TokenKind::String => {
            let text = token.text(source);
            (text.trim_matches('"').to_string(), false)
        }
        TokenKind::Lt => {
            let start = token.end();
            let mut end = start;
            for candidate in cursor.rest() {
                if candidate.kind == TokenKind::Gt {
                    end = candidate.start;
                    break;
                }
            }
            if end == start && !source[start..].starts_with('>') {
                debug!("unterminated angled include; ignoring");
                return None;
            }
            (source[start..end].trim().to_string(), true)
        }
        _ => {
            debug!("unrecognized include form; ignoring");
            return None;
        }
    };

    match ctx.resolve_include(&spelled, angled, current_dir) {
        Some(resolved) => Some(ResolvedInclude {
            spelled,
            resolved,
            angled,
        }),
        None => {
            debug!(include = %spelled, "include did not resolve");
            None
        }
    }
}

fn parse_define(ctx: &mut PreprocContext, source: &str, cursor: &mut Cursor<'_>) {
    let Some(name_token) = cursor.next_significant() else {
        debug!("#define without a name; ignoring");
        return;
    };
    let name = name_token.text(source).to_string();

    let mut params = None;
    let mut variadic = false;
    let mut body_from = name_token.end();

    // A parameter list only counts when the `(` is glued to the name.
    if let Some(next) = cursor.peek()
        && next.kind == TokenKind::LParen
        && next.start == name_token.end()
    {
        let _ = cursor.next_significant();
        let mut names = Vec::new();
        loop {
            let Some(token) = cursor.next_significant() else {
                break;
            };
            match token.kind {
                TokenKind::RParen => {
                    body_from = token.end();
                    break;
                }
                TokenKind::Comma => {}
                TokenKind::Ellipsis => variadic = true,
                TokenKind::Identifier | TokenKind::Keyword(_) => {
                    names.push(token.text(source).to_string());
                }
                _ => {}
            }
        }
        params = Some(names);
    }

    let body_to = cursor
        .rest()
        .last()
        .map(|t| t.end())
        .unwrap_or(body_from)
        .max(body_from);
    let replacement = source[body_from..body_to].trim().to_string();

    ctx.macros.define(MacroDef {
        name,
        params,
        variadic,
        replacement,
    });
}

/// A forward cursor over a directive line's tokens.
#[derive(Debug)]
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !t.kind.is_trivia())
    }

    fn next_significant(&mut self) -> Option<&'a Token> {
        while self.pos < self.tokens.len() {
            let token = &self.tokens[self.pos];
            self.pos += 1;
            if !token.kind.is_trivia() {
                return Some(token);
            }
        }
        None
    }

    fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_includes(
        ctx: &mut PreprocContext,
        source: &str,
        dir: Option<&Path>,
    ) -> Vec<String> {
        let mut seen = Vec::new();
        scan_source(ctx, source, dir, &mut |inc| {
            seen.push(inc.spelled.clone());
            ControlFlow::Continue(())
        })
        .expect("scan should succeed");
        seen
    }

    #[test]
    fn scan_selects_else_branch_when_macro_undefined() {
        //* Given
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.h"), "/* a */").expect("write a.h");
        std::fs::write(dir.path().join("b.h"), "/* b */").expect("write b.h");
        let source = "#ifdef FOO\n#include \"a.h\"\n#else\n#include \"b.h\"\n#endif\n";
        let mut ctx = PreprocContext::new();

        //* When
        let seen = collect_includes(&mut ctx, source, Some(dir.path()));

        //* Then
        assert_eq!(seen, vec!["b.h"], "only the live branch is scanned");
    }

    #[test]
    fn scan_selects_then_branch_when_macro_defined() {
        //* Given
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.h"), "/* a */").expect("write a.h");
        std::fs::write(dir.path().join("b.h"), "/* b */").expect("write b.h");
        let source = "#ifdef FOO\n#include \"a.h\"\n#else\n#include \"b.h\"\n#endif\n";
        let mut ctx = PreprocContext::new();
        ctx.macros.define_object("FOO", "1");

        //* When
        let seen = collect_includes(&mut ctx, source, Some(dir.path()));

        //* Then
        assert_eq!(seen, vec!["a.h"], "only the live branch is scanned");
    }

    #[test]
    fn scan_records_object_and_function_macros() {
        //* Given
        let source = "#define LIMIT 64\n#define MIN(a, b) ((a) < (b) ? (a) : (b))\n#define LOG(fmt, ...) printf(fmt, __VA_ARGS__)\n";
        let mut ctx = PreprocContext::new();

        //* When
        let _ = collect_includes(&mut ctx, source, None);

        //* Then
        let limit = ctx.macros.lookup("LIMIT").expect("LIMIT recorded");
        assert_eq!(limit.replacement, "64");
        assert_eq!(limit.params, None, "object-like macro has no params");

        let min = ctx.macros.lookup("MIN").expect("MIN recorded");
        assert_eq!(
            min.params.as_deref(),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert!(!min.variadic);

        let log = ctx.macros.lookup("LOG").expect("LOG recorded");
        assert!(log.variadic, "trailing ... marks the macro variadic");
    }

    #[test]
    fn scan_duplicate_defines_append_and_first_wins() {
        //* Given
        let source = "#define N 1\n#define N 2\n";
        let mut ctx = PreprocContext::new();

        //* When
        let _ = collect_includes(&mut ctx, source, None);

        //* Then
        assert_eq!(ctx.macros.len(), 2, "duplicates append silently");
        let first = ctx.macros.lookup("N").expect("N recorded");
        assert_eq!(first.replacement, "1", "lookup returns the first match");
    }

    #[test]
    fn scan_nested_conditionals_track_satisfied_branches() {
        //* Given
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["one.h", "two.h", "three.h"] {
            std::fs::write(dir.path().join(name), "/* x */").expect("write header");
        }
        let source = "#if 1\n#if 0\n#include \"one.h\"\n#elif 1\n#include \"two.h\"\n#elif 1\n#include \"three.h\"\n#endif\n#endif\n";
        let mut ctx = PreprocContext::new();

        //* When
        let seen = collect_includes(&mut ctx, source, Some(dir.path()));

        //* Then
        assert_eq!(
            seen,
            vec!["two.h"],
            "only the first satisfied branch is scanned"
        );
    }

    #[test]
    fn scan_visitor_break_stops_the_scan() {
        //* Given
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.h"), "").expect("write a.h");
        std::fs::write(dir.path().join("b.h"), "").expect("write b.h");
        let source = "#include \"a.h\"\n#include \"b.h\"\n";
        let mut ctx = PreprocContext::new();
        let mut seen = Vec::new();

        //* When
        scan_source(&mut ctx, source, Some(dir.path()), &mut |inc| {
            seen.push(inc.spelled.clone());
            ControlFlow::Break(())
        })
        .expect("scan should succeed");

        //* Then
        assert_eq!(seen, vec!["a.h"], "break stops after the first include");
    }

    #[test]
    fn scan_ignores_hash_not_at_line_start() {
        //* Given
        let source = "int x = 1; // #include \"a.h\"\nconst char *s = \"#include \\\"b.h\\\"\";\n";
        let mut ctx = PreprocContext::new();

        //* When
        let seen = collect_includes(&mut ctx, source, None);

        //* Then
        assert!(seen.is_empty(), "hashes inside code lines are not directives");
    }

    #[test]
    fn resolve_include_prefers_current_dir_for_quoted_form() {
        //* Given
        let local = tempfile::tempdir().expect("tempdir");
        let system = tempfile::tempdir().expect("tempdir");
        std::fs::write(local.path().join("dup.h"), "").expect("write local");
        std::fs::write(system.path().join("dup.h"), "").expect("write system");
        let ctx = PreprocContext::with_search_paths(vec![system.path().to_path_buf()]);

        //* When
        let quoted = ctx.resolve_include("dup.h", false, Some(local.path()));
        let angled = ctx.resolve_include("dup.h", true, Some(local.path()));

        //* Then
        assert_eq!(
            quoted.as_deref(),
            Some(local.path().join("dup.h").as_path()),
            "quoted form searches the including directory first"
        );
        assert_eq!(
            angled.as_deref(),
            Some(system.path().join("dup.h").as_path()),
            "angled form searches only the configured paths"
        );
    }
}
