use crate::cli::ReorderArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use posefilter::core::io::{compress, reorder};
use tracing::info;

pub async fn run(args: ReorderArgs, config: &PartialConfig) -> Result<()> {
    let format = config.container_format();
    info!("Reordering {:?} into {:?}", &args.input, &args.output);

    let lines = tokio::task::block_in_place(|| -> Result<usize> {
        let mut reader = compress::open_input(&args.input)?;
        let mut writer = compress::create_output(&args.output)?;
        let lines = reorder::reorder_blocks(&mut reader, &mut writer, &format)?;
        writer.finish()?;
        Ok(lines)
    })?;

    println!("✓ {} line(s) written to: {}", lines, args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn moves_header_block_ahead_of_structure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mol2");
        let output = dir.path().join("out.mol2");
        fs::write(
            &input,
            "@<TRIPOS>MOLECULE\nLIG1\n##########  Name: LIG1\n@<TRIPOS>ATOM\n1 C1\n",
        )
        .unwrap();

        let args = ReorderArgs {
            input,
            output: output.clone(),
        };
        run(args, &PartialConfig::default()).await.unwrap();
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "##########  Name: LIG1\n@<TRIPOS>MOLECULE\nLIG1\n@<TRIPOS>ATOM\n1 C1\n"
        );
    }
}
