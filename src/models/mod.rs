mod pagination;
mod post;
mod user;

pub use pagination::{PaginationMeta, PaginationParams};
pub use post::{
    parse_post_id, Author, CreatePost, Post, PostView, PostWithAuthorRow, UpdatePost,
};
pub use user::{User, UserSummary};
