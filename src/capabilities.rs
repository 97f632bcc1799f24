//! Design-file capabilities exposed over MCP.
//!
//! Thin handlers: each tool maps arguments onto an upstream endpoint and
//! returns the payload as-is. Upstream failures become handler errors, which
//! the engine surfaces as tool output (`isError: true`) rather than protocol
//! faults.

use {
    crate::registry::{
        CapabilityRegistry, PromptArgument, PromptContent, PromptDescriptor, PromptMessage,
        ResourceDescriptor,
    },
    crate::upstream::{RequestOptions, UpstreamClient},
    crate::uri_template::UriTemplate,
    anyhow::anyhow,
    schemars::JsonSchema,
    serde::Deserialize,
    serde_json::json,
    std::sync::Arc,
};

#[derive(Deserialize, JsonSchema)]
struct GetFileArgs {
    /// Key of the design file.
    file_key: String,
    /// Limit node tree depth in the response.
    depth: Option<u32>,
}

#[derive(Deserialize, JsonSchema)]
struct GetFileNodesArgs {
    file_key: String,
    /// Node ids to fetch.
    node_ids: Vec<String>,
}

#[derive(Deserialize, JsonSchema)]
struct GetCommentsArgs {
    file_key: String,
}

#[derive(Deserialize, JsonSchema)]
struct PostCommentArgs {
    file_key: String,
    /// Comment body text.
    message: String,
}

#[derive(Deserialize, JsonSchema)]
struct GetImageRendersArgs {
    file_key: String,
    node_ids: Vec<String>,
    /// Output format: png, svg, or pdf.
    format: Option<String>,
}

/// Register all design-file tools, resources, and prompts.
pub fn register_design_capabilities(
    registry: &mut CapabilityRegistry,
    upstream: Arc<UpstreamClient>,
) {
    let client = upstream.clone();
    registry.register_typed_tool::<GetFileArgs, _>(
        "get_file",
        "Fetch a design file's document tree and metadata",
        move |args| {
            let client = client.clone();
            Box::pin(async move {
                let endpoint = match args.depth {
                    Some(depth) => format!("/files/{}?depth={depth}", args.file_key),
                    None => format!("/files/{}", args.file_key),
                };
                client
                    .request(&endpoint, RequestOptions::default())
                    .await
                    .map_err(anyhow::Error::from)
            })
        },
    );

    let client = upstream.clone();
    registry.register_typed_tool::<GetFileNodesArgs, _>(
        "get_file_nodes",
        "Fetch specific nodes from a design file",
        move |args| {
            let client = client.clone();
            Box::pin(async move {
                let ids = args.node_ids.join(",");
                client
                    .request(
                        &format!("/files/{}/nodes?ids={ids}", args.file_key),
                        RequestOptions::default(),
                    )
                    .await
                    .map_err(anyhow::Error::from)
            })
        },
    );

    let client = upstream.clone();
    registry.register_typed_tool::<GetCommentsArgs, _>(
        "get_comments",
        "List comments on a design file",
        move |args| {
            let client = client.clone();
            Box::pin(async move {
                client
                    .request(
                        &format!("/files/{}/comments", args.file_key),
                        RequestOptions::default(),
                    )
                    .await
                    .map_err(anyhow::Error::from)
            })
        },
    );

    let client = upstream.clone();
    registry.register_typed_tool::<PostCommentArgs, _>(
        "post_comment",
        "Post a comment on a design file",
        move |args| {
            let client = client.clone();
            Box::pin(async move {
                client
                    .request(
                        &format!("/files/{}/comments", args.file_key),
                        RequestOptions::post(json!({"message": args.message})),
                    )
                    .await
                    .map_err(anyhow::Error::from)
            })
        },
    );

    let client = upstream.clone();
    registry.register_typed_tool::<GetImageRendersArgs, _>(
        "get_image_renders",
        "Render nodes of a design file to images",
        move |args| {
            let client = client.clone();
            Box::pin(async move {
                let ids = args.node_ids.join(",");
                let format = args.format.unwrap_or_else(|| "png".to_string());
                client
                    .request(
                        &format!("/images/{}?ids={ids}&format={format}", args.file_key),
                        RequestOptions::default(),
                    )
                    .await
                    .map_err(anyhow::Error::from)
            })
        },
    );

    let client = upstream.clone();
    let template = UriTemplate::compile("design://file/{file_key}");
    registry.register_resource(ResourceDescriptor {
        template: template.clone(),
        name: "design-file".to_string(),
        description: "Raw document tree of a design file".to_string(),
        mime_type: "application/json".to_string(),
        handler: Arc::new(move |uri| {
            let client = client.clone();
            let template = template.clone();
            Box::pin(async move {
                let vars = template
                    .matches(&uri)
                    .ok_or_else(|| anyhow!("uri does not match template: {uri}"))?;
                client
                    .request(&format!("/files/{}", vars["file_key"]), RequestOptions::default())
                    .await
                    .map_err(anyhow::Error::from)
            })
        }),
    });

    registry.register_prompt(PromptDescriptor {
        name: "design_review".to_string(),
        description: "Guide a structured review of a design file".to_string(),
        arguments: vec![PromptArgument {
            name: "file_key".to_string(),
            description: "Key of the design file to review".to_string(),
            required: true,
        }],
        handler: Arc::new(|args| {
            Box::pin(async move {
                let file_key = args
                    .get("file_key")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("file_key argument is required"))?
                    .to_string();
                Ok(PromptContent {
                    description: None,
                    messages: vec![PromptMessage::user_text(format!(
                        "Review the design file {file_key}. Fetch it with the get_file tool, \
                         then comment on layout consistency, naming, and component reuse."
                    ))],
                })
            })
        }),
    });
}
