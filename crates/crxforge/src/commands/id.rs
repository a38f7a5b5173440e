//! Id command - print the identifier a key derives to

use anyhow::Result;
use crxforge_packager::{id_from_key, RsaPublicKeyExtractor};

use crate::cli::IdArgs;

pub fn run(args: IdArgs) -> Result<()> {
    let id = id_from_key(&RsaPublicKeyExtractor, &args.key)?;
    println!("{id}");
    Ok(())
}
