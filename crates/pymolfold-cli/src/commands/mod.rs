pub mod batch;
pub mod complex;
pub mod design;
pub mod dms;
pub mod fetch;
pub mod fold;
pub mod mutate;
pub mod plddt;
pub mod workdir;

use crate::error::Result;
use pymolfold::engine::transport::{HttpTransport, Transport};
use pymolfold::predictors::design::ProteinMpnn;
use pymolfold::workflows::fold::FoldedStructure;
use pymolfold::workflows::session::Session;
use std::sync::Arc;

fn http_transport() -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new())
}

/// Design endpoints live on the PymolFold server.
fn mpnn_client(session: &Session) -> ProteinMpnn {
    ProteinMpnn::with_base_url(http_transport(), session.base_url())
}

fn report_structures(session: &Session, structures: &[FoldedStructure], pml: bool) -> Result<()> {
    for structure in structures {
        match structure.mean_plddt {
            Some(plddt) => println!(
                "✓ {} saved to: {} (mean pLDDT {:.2})",
                structure.object_name,
                structure.path.display(),
                plddt
            ),
            None => println!(
                "✓ {} saved to: {}",
                structure.object_name,
                structure.path.display()
            ),
        }
        if pml {
            if let Some(script) = plddt::write_coloring_script(&structure.path, &structure.object_name)? {
                println!("  Coloring script: {}", script.display());
            }
        }
    }
    if pml {
        let loader = plddt::write_load_script(session)?;
        println!("Load everything in PyMOL with: @{}", loader.display());
    }
    Ok(())
}
