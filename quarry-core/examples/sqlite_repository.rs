use quarry_core::{entity, Driver, Entity, Repository, SqliteDriver, Statement};
use sqlx::sqlite::SqlitePoolOptions;

entity! {
    #[derive(Debug, Clone)]
    pub struct Article {
        required: ["title"],
        safe: ["created_at"],
        timestamps: true,
        fields { id: i64, title: String, body: String, updated_at: String }
    }
}

#[tokio::main]
async fn main() -> quarry_core::Result<()> {
    // A single connection keeps every statement on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let driver = SqliteDriver::from_pool(pool);
    driver
        .execute(&Statement::new(
            "CREATE TABLE articles (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT,
                created_at TEXT,
                updated_at TEXT
            )",
        ))
        .await?;

    let mut articles: Repository<Article, _> = Repository::new(driver);

    let mut draft = Article::new();
    draft.set("title", "Hello").set("body", "First post");
    println!("Created: {}", articles.save(&mut draft).await?);

    // Missing required attributes are refused without touching the database
    let mut untitled = Article::new();
    untitled.set("body", "No title");
    println!("Created untitled: {}", articles.save(&mut untitled).await?);

    articles.select("*", false).where_("title = :title", [("title", "Hello")]);
    if let Some(mut article) = articles.first().await? {
        println!("Found article {:?}: {:?}", article.id(), article.title());

        article.set("body", "Edited");
        articles.save(&mut article).await?;
        println!("Updated at {:?}", article.updated_at());

        if let Some(id) = article.id() {
            articles.delete(id).await?;
        }
    }

    articles.select("*", false);
    println!("Remaining: {}", articles.all().await?.len());

    Ok(())
}
