use cr2_decode_rs::image_pipeline::{
    ConversionConfig, Cr2ToTiffPipeline, DecodeConfig, TiffCompression,
};
use cr2_decode_rs::logger;

use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "input.cr2".to_string());
    let output = args.next().unwrap_or_else(|| "output.tiff".to_string());

    let decode_config = DecodeConfig::default();
    let output_config = ConversionConfig::builder()
        .compression(TiffCompression::None)
        .build();
    let pipeline = Cr2ToTiffPipeline::new(decode_config, output_config);

    info!("CR2 to TIFF pipeline initialized");
    info!("Compression: {:?}", pipeline.config().compression);

    match pipeline.convert_file(&input, &output) {
        Ok(_) => info!("Conversion successful!"),
        Err(e) => error!("Conversion failed: {}", e),
    }

    Ok(())
}
