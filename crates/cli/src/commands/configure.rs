// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::config::Backend;

pub async fn run(backend: Backend, file: &Path) -> anyhow::Result<()> {
    match backend {
        Backend::Local(engine) => {
            let defs = layerform_engine::configure(&engine, file).await?;
            println!("Published {} definition(s).", defs.len());
            Ok(())
        }
        Backend::Remote(client) => {
            let defs = layerform_engine::read_definitions_file(file).await?;
            client.configure(&defs).await?;
            println!("Published {} definition(s).", defs.len());
            Ok(())
        }
    }
}
