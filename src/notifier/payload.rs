use crate::campaign_monitor::{CampaignInfo, MultiLine, Schedule, SingleLine, TemplateContent};
use crate::notifier::events::Post;
use crate::settings::SettingsRecord;

/// Campaign for a freshly published post.
///
/// Reply-to reuses the sender address; the stored reply-to setting is not
/// part of the payload.
pub fn build_campaign(settings: &SettingsRecord, post: &Post) -> CampaignInfo {
    let from_email = settings.field_or_empty("from_email");

    CampaignInfo {
        subject: post.title.clone(),
        name: post.title.clone(),
        from_name: settings.field_or_empty("from"),
        reply_to: from_email.clone(),
        from_email,
        list_ids: vec![settings.field_or_empty("chosen_list")],
        template_id: settings.field_or_empty("chosen_template"),
        template_content: TemplateContent {
            singlelines: vec![SingleLine {
                content: post.title.clone(),
                href: Some(post.permalink.clone()),
            }],
            multilines: vec![MultiLine {
                content: post.excerpt.clone(),
            }],
        },
    }
}

pub fn build_schedule(settings: &SettingsRecord) -> Schedule {
    Schedule::immediately(settings.field_or_empty("confirmation_email"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SettingsRecord {
        SettingsRecord {
            api_key: Some("key".to_string()),
            client_id: Some("client".to_string()),
            from: Some("The Blog".to_string()),
            from_email: Some("news@blog.example.com".to_string()),
            replyto_email: Some("replies@blog.example.com".to_string()),
            confirmation_email: Some("editor@blog.example.com".to_string()),
            chosen_list: Some("list-1".to_string()),
            chosen_template: Some("tpl-1".to_string()),
        }
    }

    fn post() -> Post {
        Post {
            title: "Spring Release".to_string(),
            excerpt: "Everything new this spring.".to_string(),
            post_type: "post".to_string(),
            permalink: "https://blog.example.com/spring-release".to_string(),
        }
    }

    #[test]
    fn test_campaign_fields_come_from_post_and_settings() {
        let campaign = build_campaign(&settings(), &post());

        assert_eq!(campaign.subject, "Spring Release");
        assert_eq!(campaign.name, "Spring Release");
        assert_eq!(campaign.from_name, "The Blog");
        assert_eq!(campaign.from_email, "news@blog.example.com");
        assert_eq!(campaign.list_ids, vec!["list-1"]);
        assert_eq!(campaign.template_id, "tpl-1");
    }

    #[test]
    fn test_reply_to_reuses_from_email() {
        let campaign = build_campaign(&settings(), &post());
        assert_eq!(campaign.reply_to, "news@blog.example.com");
    }

    #[test]
    fn test_template_content_binds_title_link_and_excerpt() {
        let content = build_campaign(&settings(), &post()).template_content;

        assert_eq!(content.singlelines.len(), 1);
        assert_eq!(content.singlelines[0].content, "Spring Release");
        assert_eq!(
            content.singlelines[0].href.as_deref(),
            Some("https://blog.example.com/spring-release")
        );
        assert_eq!(content.multilines.len(), 1);
        assert_eq!(content.multilines[0].content, "Everything new this spring.");
    }

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let sparse = SettingsRecord {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let campaign = build_campaign(&sparse, &post());
        assert_eq!(campaign.from_name, "");
        assert_eq!(campaign.list_ids, vec![""]);
        assert_eq!(build_schedule(&sparse).confirmation_email, "");
    }

    #[test]
    fn test_schedule_is_immediate() {
        let schedule = build_schedule(&settings());
        assert_eq!(schedule.confirmation_email, "editor@blog.example.com");
        assert_eq!(schedule.send_date, "immediately");
    }
}
