//! `geoshard fetch`: run the pipeline for one region.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use geoshard::cache::{BlobStore, CacheManager, DiskBlobStore, NoopBlobStore};
use geoshard::config::{ConfigFile, SourceKind};
use geoshard::coord::LatLon;
use geoshard::encode::LayerBuffer;
use geoshard::layer::{DetailLevel, Layer};
use geoshard::logging::init_logging;
use geoshard::pipeline::{MapRequest, PipelineOrchestrator, PipelineOutput, ProjectionPool};
use geoshard::source::{AsyncReqwestClient, FailoverRouter, SourceBackend};
use tracing::{debug, info};

use super::common::block_on;
use crate::error::CliError;

/// Arguments for `geoshard fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Center latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Center longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Radius around the center, in meters
    #[arg(long)]
    pub radius: f64,

    /// Country name, used in cache keys
    #[arg(long)]
    pub country: String,

    /// City name, used in cache keys
    #[arg(long)]
    pub city: String,

    /// Road detail: simplified or detailed (default from config)
    #[arg(long)]
    pub detail: Option<DetailLevel>,

    /// Number of road shards (default from config)
    #[arg(long)]
    pub shards: Option<usize>,

    /// Comma-separated layers: roads, water, parks, pois
    #[arg(long, value_delimiter = ',', default_value = "roads,water,parks")]
    pub layers: Vec<Layer>,

    /// Source backend: overpass or tiles (default from config)
    #[arg(long)]
    pub backend: Option<SourceKind>,

    /// Skip the persistent cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Project coordinates to Web Mercator meters
    #[arg(long)]
    pub project: bool,

    /// Write each buffer as little-endian f64 files into this directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    fn to_request(&self, config: &ConfigFile) -> MapRequest {
        MapRequest::new(
            self.country.as_str(),
            self.city.as_str(),
            LatLon::new(self.lat, self.lon),
            self.radius,
        )
        .with_detail(self.detail.unwrap_or(config.pipeline.detail))
        .with_layers(&self.layers)
        .with_shards(self.shards.unwrap_or(config.pipeline.shards))
        .with_projection(self.project)
    }
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _logging = init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let request = args.to_request(&config);
    let source = build_source(&config, args.backend)?;
    let store = build_store(&config, args.no_cache)?;
    let pool = ProjectionPool::new(config.pipeline.workers)?;
    let orchestrator =
        PipelineOrchestrator::new(Arc::new(source), Arc::new(CacheManager::new(store)), pool);

    let output = block_on(async {
        let output = orchestrator.run(&request).await;
        orchestrator.cache().flush().await;
        output
    })??;

    debug!(stats = ?orchestrator.cache().stats(), "Cache statistics");
    print_summary(&request, &output);

    if let Some(dir) = &args.output {
        let written = write_buffers(dir, &output)?;
        info!(files = written, dir = %dir.display(), "Buffers written");
        println!("Wrote {} buffer files to {}", written, dir.display());
    }

    Ok(())
}

fn build_source(
    config: &ConfigFile,
    backend: Option<SourceKind>,
) -> Result<SourceBackend<AsyncReqwestClient>, CliError> {
    let client = Arc::new(
        AsyncReqwestClient::with_timeout(config.source.timeout).map_err(CliError::SourceSetup)?,
    );

    match backend.unwrap_or(config.source.backend) {
        SourceKind::Overpass => {
            let router = FailoverRouter::new(config.source.mirrors.clone())
                .map_err(CliError::SourceSetup)?
                .with_max_retries(config.source.max_retries);
            Ok(SourceBackend::overpass(client, router))
        }
        SourceKind::Tiles => Ok(SourceBackend::tiles(
            client,
            config.source.tile_url.as_str(),
            config.source.tile_concurrency,
        )),
    }
}

fn build_store(config: &ConfigFile, no_cache: bool) -> Result<Arc<dyn BlobStore>, CliError> {
    if no_cache || !config.cache.enabled {
        return Ok(Arc::new(NoopBlobStore));
    }
    Ok(Arc::new(DiskBlobStore::new(&config.cache.directory)?))
}

fn print_summary(request: &MapRequest, output: &PipelineOutput) {
    println!(
        "{}, {} ({} m, {})",
        request.city, request.country, request.radius_m, request.detail
    );
    println!(
        "  Source:  {}",
        if output.from_cache { "cache" } else { "network" }
    );
    println!(
        "  Units:   {}",
        if output.projected { "EPSG:3857 meters" } else { "degrees" }
    );

    if request.layers.contains(&Layer::Roads) {
        let sizes: Vec<String> = output
            .road_shards
            .iter()
            .map(|s| s.feature_count().to_string())
            .collect();
        println!(
            "  roads:   {} features in {} shards [{}]",
            output.road_feature_count(),
            output.road_shards.len(),
            sizes.join(", ")
        );
    }
    for (layer, buffer) in output.buffers.iter() {
        println!("  {:<8} {} features", format!("{}:", layer), buffer.feature_count());
    }
}

/// Writes `roads_<i>.f64` per shard and `<layer>.f64` per other layer.
fn write_buffers(dir: &Path, output: &PipelineOutput) -> Result<usize, CliError> {
    std::fs::create_dir_all(dir).map_err(|error| CliError::FileWrite {
        path: dir.display().to_string(),
        error,
    })?;

    let mut files: Vec<(PathBuf, Vec<u8>)> = output
        .road_shards
        .iter()
        .enumerate()
        .map(|(i, shard)| (dir.join(format!("roads_{}.f64", i)), shard.to_le_bytes()))
        .collect();
    files.extend(output.buffers.iter().map(|(layer, buffer): (Layer, &LayerBuffer)| {
        (dir.join(format!("{}.f64", layer)), buffer.to_le_bytes())
    }));

    for (path, bytes) in &files {
        std::fs::write(path, bytes).map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoshard::encode::{encode_roads, RegionBuffers};
    use geoshard::geometry::{Feature, FeatureCollection};

    fn args() -> FetchArgs {
        FetchArgs {
            lat: 48.8566,
            lon: 2.3522,
            radius: 500.0,
            country: "France".into(),
            city: "Paris".into(),
            detail: None,
            shards: None,
            layers: vec![Layer::Roads, Layer::Water],
            backend: None,
            no_cache: false,
            project: false,
            output: None,
        }
    }

    #[test]
    fn test_request_falls_back_to_config() {
        let mut config = ConfigFile::default();
        config.pipeline.shards = 6;
        config.pipeline.detail = DetailLevel::Detailed;

        let request = args().to_request(&config);
        assert_eq!(request.shards, 6);
        assert_eq!(request.detail, DetailLevel::Detailed);
        assert_eq!(request.layers, vec![Layer::Roads, Layer::Water]);
    }

    #[test]
    fn test_flags_override_config() {
        let mut a = args();
        a.shards = Some(2);
        a.detail = Some(DetailLevel::Simplified);
        let mut config = ConfigFile::default();
        config.pipeline.detail = DetailLevel::Detailed;

        let request = a.to_request(&config);
        assert_eq!(request.shards, 2);
        assert_eq!(request.detail, DetailLevel::Simplified);
    }

    #[test]
    fn test_tiles_backend_uses_configured_concurrency() {
        let mut config = ConfigFile::default();
        config.source.tile_concurrency = 3;

        match build_source(&config, Some(SourceKind::Tiles)).unwrap() {
            SourceBackend::Tiles(tiles) => assert_eq!(tiles.concurrency(), 3),
            SourceBackend::Overpass(_) => panic!("expected the tiles backend"),
        }
    }

    #[test]
    fn test_write_buffers_names_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let roads = encode_roads(&FeatureCollection::from_features(vec![Feature::road(
            vec![(0.0, 0.0), (1.0, 1.0)],
            "primary",
        )]));
        let mut buffers = RegionBuffers::new();
        buffers.insert(
            Layer::Pois,
            LayerBuffer::Points(geoshard::encode::PointBuffer::from_vec(vec![0.0])),
        );
        let output = PipelineOutput {
            road_shards: vec![roads.clone()],
            buffers,
            from_cache: false,
            projected: false,
        };

        let out_dir = temp.path().join("out");
        assert_eq!(write_buffers(&out_dir, &output).unwrap(), 2);
        assert_eq!(
            std::fs::read(out_dir.join("roads_0.f64")).unwrap(),
            roads.to_le_bytes()
        );
        assert_eq!(std::fs::read(out_dir.join("pois.f64")).unwrap().len(), 8);
    }

    #[test]
    fn test_disabled_cache_uses_noop_store() {
        let mut config = ConfigFile::default();
        config.cache.enabled = false;
        assert!(build_store(&config, false).is_ok());
    }
}
