//! Run with: cargo run --package server --bin generate-types --features typescript

use std::fs;
use std::path::Path;

fn main() {
    println!("Generating TypeScript types...");

    let out_dir = Path::new("frontend/src/types/generated");

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "typescript")]
    {
        use ts_rs::TS;

        let mut exported = Vec::new();

        macro_rules! export {
            ($($ty:path),* $(,)?) => {
                $(
                    <$ty>::export_all_to(out_dir)
                        .unwrap_or_else(|e| panic!("Failed to export {}: {}", stringify!($ty), e));
                    exported.push(<$ty>::name());
                )*
            };
        }

        export!(
            trudy_core::Campaign,
            trudy_core::CampaignMode,
            trudy_core::CampaignStatus,
            trudy_core::CreateCampaignRequest,
            trudy_core::UpdateCampaignRequest,
            trudy_core::Brief,
            trudy_core::UpsertBriefRequest,
            trudy_core::BriefSpec,
            trudy_core::BriefClassification,
            trudy_core::BriefMode,
            trudy_core::CampaignRules,
            trudy_core::VariantDefinition,
            trudy_core::HeuristicBreakdown,
            trudy_core::Output,
            trudy_core::AgentMessage,
            trudy_core::Agent,
            trudy_core::PhaseRun,
            trudy_core::Phase,
            trudy_core::PhaseRunStatus,
            trudy_core::IdeaRoute,
            trudy_core::HeuristicScore,
            trudy_core::FounderNote,
            trudy_core::UpsertFounderNoteRequest,
            trudy_core::MarketCategoryBenchmark,
            trudy_core::PlaybookSnippet,
            trudy_core::KnowledgeEntry,
            trudy_core::KnowledgeKind,
        );

        println!("Types exported to {}", out_dir.display());

        generate_index(out_dir, &exported);
    }

    #[cfg(not(feature = "typescript"))]
    {
        eprintln!("Error: typescript feature is not enabled");
        eprintln!("Run with: cargo run --package server --bin generate-types --features typescript");
        std::process::exit(1);
    }
}

#[cfg(feature = "typescript")]
fn generate_index(out_dir: &Path, names: &[String]) {
    let mut exports = String::from(
        "// Auto-generated - regenerate with: cargo run --package server --bin generate-types --features typescript\n\n",
    );
    for name in names {
        exports.push_str(&format!("export * from './{}';\n", name));
    }

    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, exports).expect("Failed to write index.ts");

    println!("Generated {}", index_path.display());
}
