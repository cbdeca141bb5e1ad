//! Lookup command implementation

use anyhow::{bail, Context, Result};
use ferrea_core::{Aggregator, BookRecord, ProviderKind, RequestContext, Settings};

/// Look an ISBN up and print the record
pub async fn lookup(
    settings: &Settings,
    isbn: &str,
    provider: Option<ProviderKind>,
    json: bool,
) -> Result<()> {
    let isbn = isbn.trim();
    if isbn.is_empty() {
        bail!("ISBN must not be empty");
    }

    let aggregator = Aggregator::from_settings(settings).context("Failed to build providers")?;
    let ctx = RequestContext::generate(settings.app_name.as_str());
    tracing::debug!(correlation_id = %ctx.correlation_id, isbn, "starting lookup");

    let record = match provider {
        Some(kind) => {
            let provider = aggregator
                .provider(kind.name())
                .with_context(|| format!("Provider {} is not configured", kind))?;
            aggregator.lookup_with(provider, isbn, &ctx).await
        }
        None => aggregator.lookup(isbn, &ctx).await,
    };

    let Some(record) = record else {
        bail!("No record found for ISBN {}", isbn);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}

fn print_record(record: &BookRecord) {
    if let Some(title) = record.title() {
        println!("Title:       {}", title);
    }
    for (i, author) in record.authors().iter().enumerate() {
        let label = if i == 0 { "Authors:" } else { "" };
        match record.author_portraits().get(i).and_then(Option::as_ref) {
            Some(portrait) => println!("{:<12} {} ({})", label, author, portrait),
            None => println!("{:<12} {}", label, author),
        }
    }
    if let Some(publisher) = record.publisher() {
        println!("Publisher:   {}", publisher);
    }
    if let Some(year) = record.published_year() {
        println!("Year:        {}", year);
    }
    if !record.languages().is_empty() {
        println!("Languages:   {}", record.languages().join(", "));
    }
    if !record.formats().is_empty() {
        println!("Formats:     {}", record.formats().join(", "));
    }
    if let Some(cover) = record.cover_url() {
        println!("Cover:       {}", cover);
    }
    if let Some(plot) = record.plot() {
        println!("Plot:        {}", plot);
    }
}
