pub mod catalog;

pub mod errors;

pub mod kattis {
    pub mod converter;
    pub mod parser;
}

pub mod loader;

pub mod polygon {
    pub mod converter;
    pub mod parser;
    pub mod testset;
}

pub mod problem {
    pub mod assets;
    pub mod groups;
    pub mod latex;
    pub mod policy;
    pub mod program;
    pub mod scoring;
    pub mod snapshot;
}

pub mod upload {
    pub mod directory;
    pub mod memory;
    pub mod normalize;
    pub mod store;
    pub mod uploader;

    pub use uploader::Uploader;
}

pub use loader::{Format, ProblemLoader};
