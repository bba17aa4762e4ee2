// File: ./src/model/mod.rs
pub mod category;
pub mod event;
pub mod page;
pub mod user;

pub use category::{Category, CategoryFilter, CategoryId, CreateCategoryRequest, UpdateCategoryRequest};
pub use event::{
    CreateEventRequest, Event, EventFilter, EventId, EventStatus, TransitionRequest,
    UpdateEventRequest,
};
pub use page::{MessageResponse, Page};
pub use user::{
    LoginRequest, LoginResponse, RegisterRequest, TokenResponse, UpdateUserRequest, User, UserId,
    UserPatch, UserRole, UserStatus,
};
