use serde::Serialize;
use url::Url;

use primitives::{campaign::Button, Campaign};

/// Render-ready projection of a campaign, consumed by the presentation
/// layer. Building it has no side effects - no statistics, no debits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Url>,
    pub link: Url,
    /// Host of `link`, shown alongside the call to action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

/// A chosen campaign together with its render projection,
/// as returned by the serve path.
#[derive(Debug, Clone)]
pub struct DisplayableCampaign {
    pub campaign: Campaign,
    pub render: RenderModel,
}

pub fn preview(campaign: &Campaign) -> RenderModel {
    let settings = &campaign.settings;

    RenderModel {
        title: settings.title.clone(),
        description: settings.description.clone(),
        color: settings.color,
        image: settings.image.clone(),
        thumbnail: settings.thumbnail.clone(),
        link: campaign.link.clone(),
        domain: campaign.link.host_str().map(ToString::to_string),
        buttons: settings.buttons.clone(),
    }
}
