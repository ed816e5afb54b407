//! Build script for spv - embeds the git commit hash into dev builds
//!
//! Without the `release` feature, `VERGEN_GIT_SHA` is emitted so
//! `spv --version` can say which commit it was built from.
//! With `release` set, nothing is emitted and the version stays clean.

fn main() {
    #[cfg(not(feature = "release"))]
    {
        use vergen_gitcl::{Emitter, GitclBuilder};

        let git = GitclBuilder::default()
            .sha(true)
            .build()
            .expect("Failed to configure git info");

        if let Err(e) = Emitter::default()
            .add_instructions(&git)
            .expect("Failed to add git instructions")
            .emit()
        {
            // Source tarballs have no .git directory
            eprintln!("cargo:warning=Failed to get git info: {}", e);
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }
}
