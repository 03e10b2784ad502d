/*!
Command handler for the CLI

One invocation of `chat` takes exactly one of these paths:

- usage: no arguments and no piped input; print examples, touch nothing
- settings: print the resolved settings, touch nothing
- save: no prompt; re-trim the stored window under the resolved settings and save
- reply: send the prompt, print the reply, save the grown window

State is written once a reply has been folded into the window and before it
is printed, so a failed completion leaves the state file as it was while a
failed write to stdout still keeps the exchange.
*/

use crate::cli::Cli;
use crate::config::{Settings, SettingsLayer};
use crate::conversation::ConversationWindow;
use crate::error::Result;
use crate::output;
use crate::providers::Provider;
use crate::storage::StateStore;
use std::io::Write;

/// What the user asked for, after argument parsing and stdin handling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Prompt to send, if any
    pub prompt: Option<String>,
    /// Print settings and stop
    pub show_settings: bool,
    /// Settings given on the command line
    pub overrides: SettingsLayer,
    /// No arguments at all and nothing piped in
    pub bare: bool,
}

impl Invocation {
    /// Build an invocation from parsed arguments
    ///
    /// # Arguments
    ///
    /// * `cli` - Parsed command line
    /// * `piped` - Content read from stdin when it is not a terminal
    /// * `arg_count` - Number of command-line arguments, excluding the program name
    ///
    /// Piped content replaces the positional prompt unless it is blank.
    pub fn from_cli(cli: &Cli, piped: Option<String>, arg_count: usize) -> Self {
        let piped = piped.filter(|content| !content.trim().is_empty());
        let prompt = piped.or_else(|| cli.prompt.clone());

        Self {
            bare: arg_count == 0 && prompt.is_none(),
            prompt,
            show_settings: cli.settings,
            overrides: cli.overrides(),
        }
    }
}

/// Which path an invocation took
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Usage examples were printed
    Usage,
    /// Settings were printed
    Settings(Settings),
    /// No prompt; settings and the re-trimmed window were saved
    Saved {
        /// Settings that were saved
        settings: Settings,
        /// Window that was saved
        window: ConversationWindow,
    },
    /// A reply was printed; settings and the grown window were saved
    Replied {
        /// Settings used for the request
        settings: Settings,
        /// Window that was saved
        window: ConversationWindow,
        /// The assistant's reply
        reply: String,
    },
}

/// Run one invocation end to end
///
/// # Arguments
///
/// * `invocation` - What to do
/// * `store` - Persisted state location
/// * `provider` - Completion gateway
/// * `out` - Where replies, settings and usage go
/// * `width` - Border width in columns
///
/// # Errors
///
/// Returns error if the completion fails, the reply cannot be folded back
/// into the window, the state cannot be saved, or output cannot be written.
/// Only an output failure happens after the state has been saved.
pub async fn execute<W: Write>(
    invocation: &Invocation,
    store: &StateStore,
    provider: &dyn Provider,
    out: &mut W,
    width: usize,
) -> Result<RunOutcome> {
    if invocation.bare {
        output::print_usage(out)?;
        return Ok(RunOutcome::Usage);
    }

    let (persisted, window) = store.load().into_parts();
    let settings = Settings::resolve(
        &Settings::default(),
        persisted.as_ref(),
        &invocation.overrides,
    );

    if invocation.show_settings {
        output::print_settings(out, &settings)?;
        return Ok(RunOutcome::Settings(settings));
    }

    let Some(prompt) = invocation.prompt.as_deref() else {
        let window = window.trimmed(settings.retain);
        store.save(&settings, &window)?;
        tracing::info!("Saved settings without a prompt");
        return Ok(RunOutcome::Saved { settings, window });
    };

    let exchange = window.prepare(&settings.instructions, settings.retain, prompt);
    let request = exchange.request(settings.model.model_id(), settings.temperature);

    tracing::info!(
        "Requesting completion from {} with {} messages",
        request.model,
        request.messages.len()
    );
    let reply = provider.complete(&request).await?;

    let window = exchange.absorb(reply.clone())?.trimmed(settings.retain);
    store.save(&settings, &window)?;

    output::print_reply(out, &reply, settings.border, width)?;

    Ok(RunOutcome::Replied {
        settings,
        window,
        reply,
    })
}
