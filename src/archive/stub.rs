//! Bootstrap stubs
//!
//! A stub is the PHP program at the front of the archive that runs when the
//! archive is executed. Every stub must end in the halt terminator; the
//! container manifest starts right after it.

use super::phar::HALT_TERMINATOR;
use regex::Regex;
use std::sync::OnceLock;

/// Stub used when a build never sets one. It keeps the container well-formed
/// but does nothing when run.
pub const MINIMAL_STUB: &str = "<?php __HALT_COMPILER(); ?>\r\n";

/// Entry script used by the generated stub when no CLI script is named.
pub const DEFAULT_CLI_ENTRY: &str = "index.php";

fn halt_call() -> &'static Regex {
    static HALT: OnceLock<Regex> = OnceLock::new();
    HALT.get_or_init(|| {
        Regex::new(r"(?i)__HALT_COMPILER\s*\(\s*\)\s*;").expect("static regex is valid")
    })
}

/// Normalize a stub so it ends with exactly one halt terminator.
///
/// Anything after an existing `__HALT_COMPILER();` call is dropped. A stub
/// without the call gets one appended on its own line.
pub fn terminate(code: &str) -> String {
    match halt_call().find(code) {
        Some(found) => format!("{}{}", &code[..found.start()], HALT_TERMINATOR),
        None => {
            let mut stub = code.to_string();
            if !stub.is_empty() && !stub.ends_with('\n') {
                stub.push('\n');
            }
            stub.push_str(HALT_TERMINATOR);
            stub
        }
    }
}

/// Generate the default stub dispatching on the SAPI.
///
/// From the command line the stub includes `cli` from inside the archive;
/// under a web server it hands the request to `Phar::webPhar` with `web` as
/// the index. An empty `web` falls back to `cli`; an empty `cli` falls back
/// to [`DEFAULT_CLI_ENTRY`].
pub fn default_stub(cli: &str, web: &str) -> String {
    let cli = entry_name(cli).unwrap_or_else(|| DEFAULT_CLI_ENTRY.to_string());
    let web = entry_name(web).unwrap_or_else(|| cli.clone());

    format!(
        "<?php\n\
         if (in_array('phar', stream_get_wrappers()) && class_exists('Phar', false)) {{\n\
         \x20   Phar::interceptFileFuncs();\n\
         \x20   if (PHP_SAPI === 'cli') {{\n\
         \x20       require 'phar://' . __FILE__ . '/{cli}';\n\
         \x20   }} else {{\n\
         \x20       Phar::webPhar(null, '{web}');\n\
         \x20   }}\n\
         \x20   exit;\n\
         }}\n\
         die('The phar extension is required to run this archive.');\n\
         {terminator}",
        cli = quote(&cli),
        web = quote(&web),
        terminator = HALT_TERMINATOR,
    )
}

fn entry_name(path: &str) -> Option<String> {
    let normalized = crate::path::normalize_archive_path(path);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Escape for a single-quoted PHP string literal.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
