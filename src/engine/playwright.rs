//! Playwright transport: one Node.js helper process per request.
//!
//! The helper runs an inline script that owns the Chromium instance and
//! serves the engine command protocol over stdin/stdout, one JSON object per
//! line. Binary payloads come back base64-encoded. The child is spawned with
//! kill-on-drop so the browser cannot outlive its request even when the
//! explicit close handshake is skipped.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand};
use tokio::time::timeout;

use super::{Command, Engine, EngineConnection, CLOSE_DEADLINE};
use crate::error::{RenderError, Result};

/// Inline engine helper. Reads one command per stdin line, answers with one
/// JSON reply per stdout line, and exits after `close`.
const HELPER_SCRIPT: &str = r#"
'use strict';

const readline = require('readline');

let browser = null;
let context = null;
let page = null;

async function handle(request) {
  switch (request.cmd) {
    case 'launch': {
      const { chromium } = require('playwright');
      browser = await chromium.launch({ headless: true, args: ['--no-sandbox'] });
      return {};
    }
    case 'new_page': {
      const options = {};
      if (request.ignore_https_errors) {
        options.ignoreHTTPSErrors = true;
      }
      if (request.credentials) {
        options.httpCredentials = {
          username: request.credentials.username,
          password: request.credentials.password,
        };
      }
      context = await browser.newContext(options);
      page = await context.newPage();
      page.on('crash', () => {
        process.stderr.write('page crashed\n');
      });
      return {};
    }
    case 'emulate_media':
      await page.emulateMedia({ media: request.media });
      return {};
    case 'navigate': {
      const waitUntil =
        request.wait_until === 'networkidle0' || request.wait_until === 'networkidle2'
          ? 'networkidle'
          : request.wait_until;
      await page.goto(request.url, { timeout: request.timeout_ms, waitUntil });
      return {};
    }
    case 'content':
      return { content: await page.content() };
    case 'set_viewport':
      await page.setViewportSize({ width: request.width, height: request.height });
      return {};
    case 'pdf': {
      if (typeof request.scale !== 'number') {
        throw new Error('scale must be a number');
      }
      const data = await page.pdf({
        scale: request.scale,
        displayHeaderFooter: request.display_header_footer,
        printBackground: request.print_background,
        landscape: request.landscape,
      });
      return { data: data.toString('base64') };
    }
    case 'screenshot': {
      const options = {
        type: request.format,
        fullPage: request.full_page,
        omitBackground: request.omit_background,
      };
      if (request.quality > 0) {
        options.quality = request.quality;
      }
      const data = await page.screenshot(options);
      return { data: data.toString('base64') };
    }
    case 'close':
      return {};
    default:
      throw new Error(`unknown command: ${request.cmd}`);
  }
}

async function main() {
  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) {
      continue;
    }
    let request;
    try {
      request = JSON.parse(line);
    } catch (err) {
      process.stdout.write(JSON.stringify({ ok: false, error: `bad command line: ${err.message}` }) + '\n');
      continue;
    }
    let reply;
    try {
      reply = { ok: true, ...(await handle(request)) };
    } catch (err) {
      reply = { ok: false, error: err && err.message ? err.message : String(err) };
    }
    process.stdout.write(JSON.stringify(reply) + '\n');
    if (request.cmd === 'close') {
      break;
    }
  }
  if (browser) {
    await browser.close().catch(() => {});
  }
  process.exit(0);
}

main();
"#;

/// Spawns one helper process per connection.
#[derive(Debug, Clone)]
pub struct PlaywrightEngine {
    node_command: String,
}

impl PlaywrightEngine {
    pub fn new(node_command: impl Into<String>) -> Self {
        Self {
            node_command: node_command.into(),
        }
    }
}

impl Default for PlaywrightEngine {
    fn default() -> Self {
        Self::new("node")
    }
}

#[async_trait]
impl Engine for PlaywrightEngine {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>> {
        let mut child = ProcessCommand::new(&self.node_command)
            .arg("-e")
            .arg(HELPER_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| map_spawn_error(err, &self.node_command))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::launch("engine helper stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RenderError::launch("engine helper stdout unavailable"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        Ok(Box::new(PlaywrightConnection {
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
        }))
    }
}

struct PlaywrightConnection {
    child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
}

/// Reply envelope from the helper. Everything besides `ok`/`error` is the
/// command-specific payload.
#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: Value,
}

#[async_trait]
impl EngineConnection for PlaywrightConnection {
    async fn request(&mut self, command: Command) -> Result<Value> {
        let mut line = serde_json::to_string(&command)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let deadline = command.deadline();
        let reply = match timeout(deadline, self.replies.next_line()).await {
            Ok(Ok(Some(reply))) => reply,
            Ok(Ok(None)) => {
                return Err(command.failure("engine helper exited before replying"));
            }
            Ok(Err(err)) => {
                return Err(command.failure(format!("engine helper read failed: {err}")));
            }
            Err(_) => {
                let _ = self.child.start_kill();
                return Err(command.failure(format!(
                    "engine helper gave no {} reply within {:.0?}",
                    command.label(),
                    deadline
                )));
            }
        };

        let reply: Reply = serde_json::from_str(&reply)
            .map_err(|err| RenderError::engine(format!("unparseable engine reply: {err}")))?;
        if reply.ok {
            Ok(reply.payload)
        } else {
            let message = reply.error.unwrap_or_else(|| "unknown engine error".to_string());
            Err(command.failure(map_engine_message(message)))
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        match timeout(CLOSE_DEADLINE, self.child.wait()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(RenderError::engine(format!(
                "engine helper wait failed: {err}"
            ))),
            Err(_) => {
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
                Ok(())
            }
        }
    }
}

async fn forward_stderr(stderr: tokio::process::ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(target: "rendergate::engine", "{line}");
    }
}

/// Maps a helper spawn failure to an actionable launch error.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> RenderError {
    if err.kind() == io::ErrorKind::NotFound {
        RenderError::launch(format!(
            "unable to spawn the engine helper; '{}' was not found on PATH",
            command
        ))
    } else {
        RenderError::launch(format!("unable to spawn the engine helper: {err}"))
    }
}

/// Attaches install hints to the engine failures operators actually hit.
pub(crate) fn map_engine_message(message: String) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("cannot find module 'playwright'") {
        return "Playwright npm package is missing; install with `npm install playwright`."
            .to_string();
    }
    if lower.contains("executable doesn't exist") || lower.contains("browsertype.launch") {
        return format!(
            "{message} (run `npx playwright install chromium` to download the browser)"
        );
    }
    message
}
