#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod backend;
pub mod llm;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod rest;

#[cfg(test)]
mod tests {
    pub mod data;
}
