//! Blog Post Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{BlogPost, BlogPostCreate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "blog_post";

#[derive(Clone)]
pub struct BlogPostRepository {
    base: BaseRepository,
}

impl BlogPostRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All posts, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<BlogPost>> {
        let posts: Vec<BlogPost> = self
            .base
            .db()
            .query("SELECT * FROM blog_post ORDER BY date_posted DESC")
            .await?
            .take(0)?;
        Ok(posts)
    }

    /// Find post by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<BlogPost>> {
        let thing = parse_record_id(id)?;
        let post: Option<BlogPost> = self.base.db().select(thing).await?;
        Ok(post)
    }

    /// Create a post
    pub async fn create(&self, data: BlogPostCreate) -> RepoResult<BlogPost> {
        if data.title.trim().is_empty() {
            return Err(RepoError::Validation("Title must not be empty".to_string()));
        }

        let post = BlogPost {
            id: None,
            title: data.title,
            content: data.content,
            date_posted: now_millis(),
        };

        let created: Option<BlogPost> = self.base.db().create(TABLE).content(post).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create blog post".to_string()))
    }
}
