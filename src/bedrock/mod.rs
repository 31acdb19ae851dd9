pub mod vision_client;

use crate::{
    codefix::{is_likely_broken, maybe_repair, sanitize, strip_code_fence},
    config::Config,
    error::Result,
    logger,
    models::{GenerationRequest, GenerationResponse, PromptPart, UploadRequest, UploadResponse},
    prompts,
    store::{ImageRecord, ImageStore},
};
use aws_sdk_bedrockruntime::Client;
use std::sync::Arc;

pub use vision_client::VisionClient;

/// Facade over the vision client, the image store and the generation
/// defaults. One instance serves the whole process.
#[derive(Clone)]
pub struct SketchClient {
    vision_client: VisionClient,
    store: Arc<ImageStore>,
    config: Config,
}

impl SketchClient {
    pub async fn new(config: Config) -> Result<Self> {
        config.bedrock.validate()?;

        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.bedrock.access_key, &config.bedrock.secret_key)
        {
            aws_config::from_env()
                .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "sketchgen-client",
                ))
                .region(aws_sdk_bedrockruntime::config::Region::new(
                    config
                        .bedrock
                        .region
                        .clone()
                        .unwrap_or_else(|| "us-east-1".to_string()),
                ))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        let client = Client::new(&aws_config);

        Ok(Self {
            vision_client: VisionClient::new(
                client,
                config.generation.max_tokens,
                config.generation.temperature,
            ),
            store: Arc::new(ImageStore::new(config.store.clone())),
            config,
        })
    }

    pub fn vision(&self) -> &VisionClient {
        &self.vision_client
    }

    pub fn store(&self) -> &Arc<ImageStore> {
        &self.store
    }

    /// Full image-to-component flow: resolve the image, build the prompt,
    /// invoke the model once, then sanitize, detect and (at most once by
    /// default) repair the generated text.
    pub async fn generate_component(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse> {
        let _timer = logger::timer("generate_component");

        let model_id = request
            .model_id
            .clone()
            .unwrap_or_else(|| self.config.generation.default_model_id.clone());

        let description = request.image_description.clone().or_else(|| {
            request
                .image_id
                .as_deref()
                .and_then(|id| self.store.get(id))
                .and_then(|record| record.description)
        });

        let image_part = self.vision_client.resolve_image(&request.image).await?;

        let mut instruction = prompts::GENERATION_INSTRUCTION.to_string();
        if request.use_component_library {
            instruction.push_str("\n\n");
            instruction.push_str(prompts::COMPONENT_LIBRARY_ADDENDUM);
        }
        if let Some(description) = description {
            instruction.push_str("\n\nWhat the image shows: ");
            instruction.push_str(&description);
        }

        let parts = vec![PromptPart::Text(instruction), image_part];
        let raw = self.vision_client.generate(&model_id, &parts).await?;

        let sanitized = sanitize(&strip_code_fence(&raw));
        let broken = is_likely_broken(&sanitized);
        let attempts = self.config.generation.repair_attempts;

        let code = if broken && attempts > 0 {
            maybe_repair(&sanitized, &self.vision_client, &model_id, attempts).await
        } else {
            sanitized
        };

        Ok(GenerationResponse {
            code,
            model: model_id,
            repair_attempted: broken && attempts > 0,
        })
    }

    /// Asks the model for a short textual description of an image; used at
    /// upload time to enrich later generation prompts.
    pub async fn describe_image(&self, data_uri: &str) -> Result<String> {
        let image_part = self
            .vision_client
            .resolve_image(&crate::models::ImageSource::DataUri {
                uri: data_uri.to_string(),
            })
            .await?;

        let parts = vec![
            PromptPart::Text(prompts::DESCRIBE_IMAGE_PROMPT.to_string()),
            image_part,
        ];

        let text = self
            .vision_client
            .generate(&self.config.generation.default_model_id, &parts)
            .await?;

        Ok(text.trim().to_string())
    }

    /// Registers an uploaded image: validates the data URI, asks the model
    /// for a best-effort description (failures degrade to no description),
    /// stores the record and hands back its id.
    pub async fn register_upload(&self, request: UploadRequest) -> Result<UploadResponse> {
        crate::models::parse_data_uri(&request.data_url)?;

        let description = match self.describe_image(&request.data_url).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                log::warn!("image description failed, storing upload without one: {}", e);
                None
            }
        };

        let name = request
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string());

        let record = ImageRecord::new(
            request.data_url.clone(),
            description.clone(),
            request.file_name,
        );
        let image_id = self.store.insert(record);

        Ok(UploadResponse {
            url: request.data_url,
            name,
            image_id,
            description,
        })
    }
}
