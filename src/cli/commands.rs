use serde::Serialize;

use crate::api::BookmarkUpdate;
use crate::app::{AppContext, HatebError, Result};
use crate::cli::{BookmarkAction, SearchArgs};
use crate::domain::EntryLookup;
use crate::search::SearchQuery;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| HatebError::Io(std::io::Error::other(e)))?;
    println!("{}", text);
    Ok(())
}

pub async fn bookmark(ctx: &AppContext, action: BookmarkAction) -> Result<()> {
    let api = ctx.api()?;

    match action {
        BookmarkAction::Get { url } => match api.get_bookmark(&url).await? {
            Some(bookmark) => print_json(&bookmark)?,
            None => println!("No bookmark for {}", url),
        },
        BookmarkAction::Add {
            url,
            comment,
            tags,
            private,
            post_twitter,
            post_mixi,
            post_evernote,
        } => {
            let update = BookmarkUpdate::new(&url)
                .with_comment(comment)
                .with_tags(tags)
                .with_private(private)
                .with_post_twitter(post_twitter)
                .with_post_mixi(post_mixi)
                .with_post_evernote(post_evernote);

            match api.update_bookmark(&update).await? {
                Some(bookmark) => print_json(&bookmark)?,
                None => println!("Nothing saved for {}", url),
            }
        }
        BookmarkAction::Delete { url } => {
            let status = api.delete_bookmark(&url).await?;
            if status.is_success() {
                println!("Deleted bookmark for {}", url);
            } else {
                println!("No bookmark to delete for {} ({})", url, status);
            }
        }
    }

    Ok(())
}

pub async fn entry(ctx: &AppContext, url: &str) -> Result<()> {
    let lookup = ctx.api()?.get_entry(url).await?;
    if let EntryLookup::NotFound(ref nf) = lookup {
        tracing::info!("No entry data for {}: {}", url, nf.message);
    }
    print_json(&lookup)
}

pub async fn tags(ctx: &AppContext) -> Result<()> {
    let tags = ctx.api()?.get_tags().await?;
    for tag in &tags {
        println!("{:>6}  {}", tag.count, tag.tag);
    }
    Ok(())
}

pub async fn user(ctx: &AppContext) -> Result<()> {
    let user = ctx.api()?.get_user_info().await?;
    print_json(&user)
}

pub async fn count(ctx: &AppContext, urls: &[String]) -> Result<()> {
    let api = ctx.api()?;

    if let [url] = urls {
        let count = api.get_bookmark_count(url).await?;
        println!("{}", count);
        return Ok(());
    }

    let counts = api.get_bookmark_counts(urls).await?;
    for url in urls {
        let count = counts.get(url).copied().unwrap_or(0);
        println!("{:>6}  {}", count, url);
    }
    Ok(())
}

pub async fn search(ctx: &AppContext, args: SearchArgs) -> Result<()> {
    let mut query = SearchQuery::new(args.search_type, args.query)
        .with_sort(args.sort)
        .with_date_range(args.date_begin, args.date_end)
        .with_skip(args.skip)
        .with_max_pages(args.max_pages.unwrap_or(ctx.config.search.max_pages));
    query.users = args.users;
    query.limit = args.limit;

    let entries = ctx.search.search(&query).await?;
    tracing::info!("Found {} entries", entries.len());
    print_json(&entries)
}
