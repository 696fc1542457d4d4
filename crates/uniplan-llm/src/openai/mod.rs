pub mod client;

pub use client::{OpenAIClient, GROQ_API_BASE, OPENAI_API_BASE};
