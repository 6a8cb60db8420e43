//! # Wrapper Synthesizer
//!
//! Builds the program that is actually handed to the interpreter. The wrapper
//! embeds the learner's code unchanged as a string literal and evaluates it
//! inside a harness that:
//!
//! - replaces the language's input primitive so each call returns the next line
//!   of the test input,
//! - captures everything written to standard output into a buffer,
//! - turns an exception escaping the learner's code into a diagnostic on
//!   standard error plus exit status 1,
//! - flushes the captured buffer to the real standard output on the way out.
//!
//! The same input is also piped to the process's real standard input (see
//! [`stdin_text`]), so code that reads the stream directly sees it too.
//! Trimming the captured output is left to the judge.

use serde_json::Value;
use util::languages::Language;

/// Embeds `user_code` and `test_input` into a runnable program for `language`.
///
/// Unsupported languages never reach this point: they are rejected when the
/// language name is parsed into a [`Language`].
pub fn synthesize(user_code: &str, test_input: &str, language: Language) -> String {
    let lines: Vec<&str> = test_input.lines().collect();
    match language {
        Language::Python => python_wrapper(user_code, &stdin_text(test_input)),
        Language::JavaScript => javascript_wrapper(user_code, &lines),
    }
}

/// The bytes fed to the program: the input's lines, each ending in `\n`.
pub fn stdin_text(test_input: &str) -> String {
    test_input.lines().fold(String::new(), |mut text, line| {
        text.push_str(line);
        text.push('\n');
        text
    })
}

/// Quotes `s` as a JSON string literal, which both Python and JavaScript accept.
fn literal(s: &str) -> String {
    Value::from(s).to_string()
}

fn lines_literal(lines: &[&str]) -> String {
    Value::from(lines.to_vec()).to_string()
}

fn python_wrapper(user_code: &str, stdin_text: &str) -> String {
    let mut out = String::with_capacity(user_code.len() + stdin_text.len() + 1024);
    out.push_str(
        "import io as _grader_io\n\
         import sys as _grader_sys\n\
         import traceback as _grader_tb\n\
         \n\
         _grader_real_stdout = _grader_sys.stdout\n\
         _grader_buffer = _grader_io.StringIO()\n\
         _grader_failed = False\n",
    );
    out.push_str("_grader_sys.stdin = _grader_io.StringIO(");
    out.push_str(&literal(stdin_text));
    out.push_str(")\n");
    out.push_str("_grader_source = ");
    out.push_str(&literal(user_code));
    out.push('\n');
    out.push_str(
        "_grader_sys.stdout = _grader_buffer\n\
         try:\n\
         \x20   exec(compile(_grader_source, \"submission.py\", \"exec\"), {\"__name__\": \"__main__\"})\n\
         except SystemExit as _grader_exit:\n\
         \x20   if _grader_exit.code not in (None, 0):\n\
         \x20       _grader_failed = True\n\
         \x20       print(\"SystemExit: %s\" % (_grader_exit.code,), file=_grader_sys.stderr)\n\
         except BaseException:\n\
         \x20   _grader_failed = True\n\
         \x20   _grader_type, _grader_value, _grader_trace = _grader_sys.exc_info()\n\
         \x20   _grader_tb.print_exception(_grader_type, _grader_value, _grader_trace.tb_next if _grader_trace else None, file=_grader_sys.stderr)\n\
         finally:\n\
         \x20   _grader_sys.stdout = _grader_real_stdout\n\
         \x20   _grader_real_stdout.write(_grader_buffer.getvalue())\n\
         \x20   _grader_real_stdout.flush()\n\
         \n\
         if _grader_failed:\n\
         \x20   _grader_sys.exit(1)\n",
    );
    out
}

fn javascript_wrapper(user_code: &str, lines: &[&str]) -> String {
    let mut out = String::with_capacity(user_code.len() + 2048);
    out.push_str(
        "const __graderFs = require(\"fs\");\n\
         const __graderUtil = require(\"util\");\n\
         const __graderVm = require(\"vm\");\n\
         const __graderModule = { id: \".\", exports: {}, filename: __filename, loaded: false, children: [], paths: module.paths };\n\
         const __graderRequire = Object.assign((id) => require(id), require, { main: __graderModule });\n",
    );
    out.push_str("const __graderLines = ");
    out.push_str(&lines_literal(lines));
    out.push_str(";\n");
    out.push_str("const __graderSource = ");
    out.push_str(&literal(user_code));
    out.push_str(";\n");
    out.push_str(
        "let __graderCursor = 0;\n\
         const __graderCaptured = [];\n\
         let __graderFlushed = false;\n\
         \n\
         function __graderFlush() {\n\
         \x20 if (__graderFlushed) return;\n\
         \x20 __graderFlushed = true;\n\
         \x20 const text = __graderCaptured.join(\"\");\n\
         \x20 if (text.length > 0) __graderFs.writeSync(1, text);\n\
         }\n\
         \n\
         function __graderReport(err) {\n\
         \x20 let text = \"Uncaught \" + String(err);\n\
         \x20 if (err instanceof Error) {\n\
         \x20   const frames = String(err.stack || \"\").split(\"\\n\").filter((line) => line.includes(\"submission.js:\"));\n\
         \x20   frames.push(err.name + \": \" + err.message);\n\
         \x20   text = frames.join(\"\\n\");\n\
         \x20 }\n\
         \x20 __graderFs.writeSync(2, text + \"\\n\");\n\
         \x20 process.exitCode = 1;\n\
         }\n\
         \n\
         function __graderInput() {\n\
         \x20 return __graderCursor < __graderLines.length ? __graderLines[__graderCursor++] : null;\n\
         }\n\
         \n\
         globalThis.input = __graderInput;\n\
         globalThis.prompt = __graderInput;\n\
         globalThis.readline = __graderInput;\n\
         \n\
         const __graderLog = (...args) => {\n\
         \x20 __graderCaptured.push(__graderUtil.format(...args) + \"\\n\");\n\
         };\n\
         console.log = __graderLog;\n\
         console.info = __graderLog;\n\
         console.debug = __graderLog;\n\
         process.stdout.write = (chunk, ...rest) => {\n\
         \x20 __graderCaptured.push(typeof chunk === \"string\" ? chunk : String(chunk));\n\
         \x20 const callback = rest.find((arg) => typeof arg === \"function\");\n\
         \x20 if (callback) callback();\n\
         \x20 return true;\n\
         };\n\
         \n\
         process.on(\"uncaughtException\", __graderReport);\n\
         process.on(\"unhandledRejection\", __graderReport);\n\
         process.on(\"exit\", __graderFlush);\n\
         \n\
         try {\n\
         \x20 const main = __graderVm.compileFunction(\n\
         \x20   __graderSource,\n\
         \x20   [\"exports\", \"require\", \"module\", \"__filename\", \"__dirname\"],\n\
         \x20   { filename: \"submission.js\" },\n\
         \x20 );\n\
         \x20 main.call(__graderModule.exports, __graderModule.exports, __graderRequire, __graderModule, __filename, __dirname);\n\
         \x20 __graderModule.loaded = true;\n\
         } catch (err) {\n\
         \x20 __graderReport(err);\n\
         }\n",
    );
    out
}
