use polyslug::config::{
    Config, DatabaseConfig, LocaleConfig, ResolverKind, SlugsConfig, UniquenessScope,
};
use polyslug::models::{Feature, Locale, ModelConfig, RecordId};
use polyslug::services::{HistoryStore, LocaleContext, SlugEngine, TranslationStore};
use polyslug::{Database, SlugError};

fn create_test_db() -> Database {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen();
    let name = format!("test_db_{}", id);

    let db = Database::open_memory(&name).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

fn post_model() -> ModelConfig {
    ModelConfig::new("post")
        .translates(&["title", "body", "slug"])
        .with_feature(Feature::History)
}

fn test_config(models: Vec<ModelConfig>, slugs: SlugsConfig) -> Config {
    Config {
        database: DatabaseConfig {
            path: ":memory:".to_string(),
            pool_size: 4,
        },
        locale: LocaleConfig::default(),
        slugs,
        models,
    }
}

fn engine_with(models: Vec<ModelConfig>, slugs: SlugsConfig) -> SlugEngine {
    SlugEngine::new(&test_config(models, slugs), create_test_db()).expect("Failed to build engine")
}

fn engine() -> SlugEngine {
    engine_with(vec![post_model()], SlugsConfig::default())
}

fn new_post(engine: &SlugEngine, titles: &[(&str, &str)]) -> RecordId {
    let store = engine.store();
    let id = store.create_record("post").unwrap();
    for (locale, title) in titles {
        store
            .put_translation(id, &Locale::from(*locale), &[("title", *title)])
            .unwrap();
    }
    id
}

fn slug_of(engine: &SlugEngine, id: RecordId, locale: &str) -> Option<String> {
    engine
        .store()
        .get(id, &Locale::from(locale), "slug")
        .unwrap()
}

mod assignment_tests {
    use super::*;

    #[test]
    fn test_each_locale_gets_its_own_slug() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World"), ("fr", "Bonjour le Monde")]);

        let mut ctx = engine.context();
        let assigned = engine.assigner("post").unwrap().assign(&mut ctx, r, None).unwrap();

        assert_eq!(assigned.len(), 2);
        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("hello-world"));
        assert_eq!(slug_of(&engine, r, "fr").as_deref(), Some("bonjour-le-monde"));

        let finder = engine.finder("post").unwrap();
        assert!(finder.exists_by_slug(&ctx, "hello-world").unwrap());
        assert!(finder.exists_by_slug(&ctx, "bonjour-le-monde").unwrap());
        assert_eq!(finder.find_by_slug(&ctx, "bonjour-le-monde").unwrap(), Some(r));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World")]);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        assigner.assign(&mut ctx, r, None).unwrap();
        engine
            .store()
            .put_translation(r, &Locale::from("en"), &[("title", "Goodbye World")])
            .unwrap();
        let second = assigner.assign(&mut ctx, r, None).unwrap();

        assert!(second.is_empty());
        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_new_locale_does_not_disturb_existing_slug() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World")]);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();
        assigner.assign(&mut ctx, r, None).unwrap();

        engine
            .store()
            .put_translation(r, &Locale::from("de"), &[("title", "Hallo Welt")])
            .unwrap();
        let assigned = assigner.assign(&mut ctx, r, None).unwrap();

        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].locale, Locale::from("de"));
        assert_eq!(assigned[0].slug, "hallo-welt");
        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_conflict_is_resolved_with_suffix() {
        let engine = engine();
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("en", "Hello, World!")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "en").as_deref(), Some("hello-world-2"));

        let finder = engine.finder("post").unwrap();
        assert!(finder.exists_by_slug(&ctx, "hello-world-2").unwrap());
        assert_eq!(finder.find_by_slug(&ctx, "hello-world-2").unwrap(), Some(r2));
        assert_eq!(finder.find_by_slug(&ctx, "hello-world").unwrap(), Some(r));
    }

    #[test]
    fn test_same_text_in_two_locales_of_one_record() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Paris"), ("fr", "Paris")]);
        let mut ctx = engine.context();
        engine.assigner("post").unwrap().assign(&mut ctx, r, None).unwrap();

        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("paris"));
        assert_eq!(slug_of(&engine, r, "fr").as_deref(), Some("paris"));
    }

    #[test]
    fn test_fresh_record_uses_current_locale() {
        let engine = engine();
        let id = engine.store().create_record("post").unwrap();
        let mut ctx = LocaleContext::new("fr");

        let assigned = engine
            .assigner("post")
            .unwrap()
            .assign(&mut ctx, id, Some("Nouvelle Page"))
            .unwrap();

        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].locale, Locale::from("fr"));
        assert_eq!(
            engine.store().list_locales(id).unwrap(),
            vec![Locale::from("fr")]
        );
        assert_eq!(slug_of(&engine, id, "fr").as_deref(), Some("nouvelle-page"));
    }

    #[test]
    fn test_empty_base_still_gets_a_slug() {
        let engine = engine();
        let id = engine.store().create_record("post").unwrap();
        let mut ctx = engine.context();

        let assigned = engine.assigner("post").unwrap().assign(&mut ctx, id, None).unwrap();

        assert_eq!(assigned[0].slug, "post-2");
    }

    #[test]
    fn test_reserved_words_are_skipped() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "New")]);
        let mut ctx = engine.context();
        engine.assigner("post").unwrap().assign(&mut ctx, r, None).unwrap();

        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("new-2"));
    }

    #[test]
    fn test_set_slug_for_one_locale() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World"), ("fr", "Bonjour le Monde")]);
        let mut ctx = engine.context();

        let assigned = engine
            .assigner("post")
            .unwrap()
            .set_slug_for(&mut ctx, r, "Salut tout le monde", Some(&Locale::from("fr")))
            .unwrap();

        assert_eq!(assigned.map(|a| a.slug).as_deref(), Some("salut-tout-le-monde"));
        assert_eq!(slug_of(&engine, r, "en"), None);
        assert_eq!(ctx.current().as_str(), "en");
    }

    #[test]
    fn test_exhausted_resolver_fails_the_assignment() {
        let slugs = SlugsConfig {
            max_attempts: 1,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![post_model()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        for _ in 0..2 {
            let r = new_post(&engine, &[("en", "Hello World")]);
            assigner.assign(&mut ctx, r, None).unwrap();
        }
        let r3 = new_post(&engine, &[("en", "Hello World"), ("fr", "Bonjour")]);
        let err = assigner.assign(&mut ctx, r3, None).unwrap_err();

        assert!(matches!(err, SlugError::ConflictResolution { attempts: 1, .. }));
        assert_eq!(slug_of(&engine, r3, "en"), None);
        assert_eq!(slug_of(&engine, r3, "fr"), None);
        assert_eq!(ctx.current().as_str(), "en");
    }

    #[test]
    fn test_uuid_resolver() {
        let slugs = SlugsConfig {
            resolver: ResolverKind::Uuid,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![post_model()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        let slug = slug_of(&engine, r2, "en").unwrap();
        assert!(slug.starts_with("hello-world-"));
        assert_ne!(slug, "hello-world");
    }

    #[test]
    fn test_unknown_record() {
        let engine = engine();
        let mut ctx = engine.context();
        let err = engine
            .assigner("post")
            .unwrap()
            .assign(&mut ctx, RecordId(999), None)
            .unwrap_err();
        assert!(matches!(err, SlugError::RecordNotFound(999)));
    }
}

mod uniqueness_tests {
    use super::*;

    fn plain_post() -> ModelConfig {
        ModelConfig::new("post").translates(&["title", "slug"])
    }

    #[test]
    fn test_global_scope_spans_locales() {
        let engine = engine_with(vec![plain_post()], SlugsConfig::default());
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Chat")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("fr", "Chat")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "fr").as_deref(), Some("chat-2"));
    }

    #[test]
    fn test_per_locale_scope() {
        let slugs = SlugsConfig {
            uniqueness: UniquenessScope::PerLocale,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![plain_post()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Chat")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("fr", "Chat")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "fr").as_deref(), Some("chat"));

        let finder = engine.finder("post").unwrap();
        assert_eq!(
            finder.find_by_slug(&LocaleContext::new("fr"), "chat").unwrap(),
            Some(r2)
        );
        assert_eq!(
            finder.find_by_slug(&LocaleContext::new("en"), "chat").unwrap(),
            Some(r)
        );
    }

    #[test]
    fn test_per_locale_scope_with_history() {
        let slugs = SlugsConfig {
            uniqueness: UniquenessScope::PerLocale,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![post_model()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Chat")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("fr", "Chat")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "fr").as_deref(), Some("chat"));

        let r3 = new_post(&engine, &[("en", "Chat")]);
        assigner.assign(&mut ctx, r3, None).unwrap();
        assert_eq!(slug_of(&engine, r3, "en").as_deref(), Some("chat-2"));

        let finder = engine.finder("post").unwrap();
        assert_eq!(
            finder.find_by_slug(&LocaleContext::new("en"), "chat").unwrap(),
            Some(r)
        );
        assert_eq!(
            finder.find_by_slug(&LocaleContext::new("fr"), "chat").unwrap(),
            Some(r2)
        );
    }

    #[test]
    fn test_per_locale_history_blocks_same_locale_only() {
        let slugs = SlugsConfig {
            uniqueness: UniquenessScope::PerLocale,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![post_model()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "Chat")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        assigner.rename(&ctx, r, "Cat").unwrap();

        let r2 = new_post(&engine, &[("en", "Chat"), ("fr", "Chat")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "en").as_deref(), Some("chat-2"));
        assert_eq!(slug_of(&engine, r2, "fr").as_deref(), Some("chat"));
        assert_eq!(
            engine
                .finder("post")
                .unwrap()
                .find_by_slug(&LocaleContext::new("en"), "chat")
                .unwrap(),
            Some(r)
        );
    }

    #[test]
    fn test_suffixed_slugs_respect_max_length() {
        let slugs = SlugsConfig {
            max_length: 8,
            ..SlugsConfig::default()
        };
        let engine = engine_with(vec![post_model()], slugs);
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();

        let r = new_post(&engine, &[("en", "abcdefgh")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        let r2 = new_post(&engine, &[("en", "abcdefgh")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("abcdefgh"));
        assert_eq!(slug_of(&engine, r2, "en").as_deref(), Some("abcdef-2"));
    }

    #[test]
    fn test_models_do_not_share_slugs() {
        let page = ModelConfig::new("page").translates(&["title", "slug"]);
        let engine = engine_with(vec![plain_post(), page], SlugsConfig::default());
        let mut ctx = engine.context();

        let post = new_post(&engine, &[("en", "About")]);
        engine.assigner("post").unwrap().assign(&mut ctx, post, None).unwrap();

        let page = engine.store().create_record("page").unwrap();
        engine
            .store()
            .put_translation(page, &Locale::from("en"), &[("title", "About")])
            .unwrap();
        engine.assigner("page").unwrap().assign(&mut ctx, page, None).unwrap();

        assert_eq!(slug_of(&engine, page, "en").as_deref(), Some("about"));
    }
}

mod history_tests {
    use super::*;

    #[test]
    fn test_old_slug_still_resolves_after_rename() {
        let engine = engine();
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();
        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();

        let renamed = assigner.rename(&ctx, r, "Greetings World").unwrap();
        assert_eq!(renamed.slug, "greetings-world");
        assert_eq!(slug_of(&engine, r, "en").as_deref(), Some("greetings-world"));

        let finder = engine.finder("post").unwrap();
        assert!(finder.exists_by_slug(&ctx, "hello-world").unwrap());
        assert_eq!(finder.find_by_slug(&ctx, "hello-world").unwrap(), Some(r));
        assert_eq!(finder.find_by_slug(&ctx, "greetings-world").unwrap(), Some(r));
    }

    #[test]
    fn test_historical_slug_is_not_reused() {
        let engine = engine();
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();
        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        assigner.rename(&ctx, r, "Greetings World").unwrap();

        let r2 = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r2, None).unwrap();

        assert_eq!(slug_of(&engine, r2, "en").as_deref(), Some("hello-world-2"));
        assert_eq!(
            engine.finder("post").unwrap().find_by_slug(&ctx, "hello-world").unwrap(),
            Some(r)
        );
    }

    #[test]
    fn test_record_can_take_back_its_old_slug() {
        let engine = engine();
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();
        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        assigner.rename(&ctx, r, "Greetings").unwrap();

        let back = assigner.rename(&ctx, r, "Hello World").unwrap();
        assert_eq!(back.slug, "hello-world");
    }

    #[test]
    fn test_history_is_logged_per_locale() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World"), ("fr", "Bonjour le Monde")]);
        let mut ctx = engine.context();
        engine.assigner("post").unwrap().assign(&mut ctx, r, None).unwrap();

        let entries = engine.store().list(r).unwrap();
        let logged: Vec<(String, Option<String>)> = entries
            .into_iter()
            .map(|e| (e.slug, e.locale.map(|l| l.to_string())))
            .collect();
        assert_eq!(
            logged,
            vec![
                ("hello-world".to_string(), Some("en".to_string())),
                ("bonjour-le-monde".to_string(), Some("fr".to_string())),
            ]
        );
    }

    #[test]
    fn test_history_rows_are_append_only() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World")]);
        let mut ctx = engine.context();
        engine.assigner("post").unwrap().assign(&mut ctx, r, None).unwrap();

        let conn = engine.store().database().get().unwrap();
        let result = conn.execute("UPDATE slug_history SET slug = 'tampered'", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_rename_without_history_drops_old_slug() {
        let model = ModelConfig::new("post").translates(&["title", "slug"]);
        let engine = engine_with(vec![model], SlugsConfig::default());
        let assigner = engine.assigner("post").unwrap();
        let mut ctx = engine.context();
        let r = new_post(&engine, &[("en", "Hello World")]);
        assigner.assign(&mut ctx, r, None).unwrap();
        assigner.rename(&ctx, r, "Greetings World").unwrap();

        let finder = engine.finder("post").unwrap();
        assert!(!finder.exists_by_slug(&ctx, "hello-world").unwrap());
        assert!(finder.exists_by_slug(&ctx, "greetings-world").unwrap());
    }
}

mod registration_tests {
    use super::*;

    #[test]
    fn test_engine_rejects_untranslated_model() {
        let model = ModelConfig::new("post").translates(&["slug"]);
        let result = SlugEngine::new(&test_config(vec![model], SlugsConfig::default()), create_test_db());

        let err = result.err().expect("registration should fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn test_engine_rejects_model_without_translations() {
        let result = SlugEngine::new(
            &test_config(vec![ModelConfig::new("post")], SlugsConfig::default()),
            create_test_db(),
        );
        assert!(matches!(result.err(), Some(SlugError::NotTranslated { .. })));
    }

    #[test]
    fn test_unknown_model() {
        let engine = engine();
        assert!(matches!(
            engine.assigner("page").err(),
            Some(SlugError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "./data/polyslug.db"

            [slugs]
            uniqueness = "per_locale"
            resolver = "uuid"

            [[models]]
            name = "post"
            translates = true
            translated_fields = ["title", "slug"]
            features = ["history", "finders"]
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.slugs.uniqueness, UniquenessScope::PerLocale);
        assert_eq!(config.slugs.resolver, ResolverKind::Uuid);
        assert_eq!(config.locale.default, "en");
        let post = config.model("post").unwrap();
        assert_eq!(post.base_field, "title");
        assert!(post.uses(Feature::History));
        assert!(post.uses(Feature::Finders));
    }

    #[test]
    fn test_config_rejects_bad_separator() {
        let mut config = test_config(vec![], SlugsConfig::default());
        config.slugs.separator = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_malformed_reserved_word() {
        let mut config = test_config(vec![], SlugsConfig::default());
        config.slugs.reserved.push("Admin Area".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Admin Area"));
    }

    #[test]
    fn test_config_rejects_duplicate_models() {
        let config = test_config(vec![post_model(), post_model()], SlugsConfig::default());
        assert!(config.validate().is_err());
    }
}

mod database_tests {
    use super::*;

    #[test]
    fn test_migrations_are_recorded() {
        let db = create_test_db();
        let statuses = db.get_migration_status().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|(_, applied)| applied.is_some()));
        assert!(db.health_check().unwrap());
    }

    #[test]
    fn test_translations_round_trip() {
        let engine = engine();
        let r = new_post(&engine, &[("en", "Hello World")]);
        engine
            .store()
            .put_translation(r, &Locale::from("en"), &[("body", "Text")])
            .unwrap();

        let translation = engine
            .store()
            .get_translation(r, &Locale::from("en"))
            .unwrap()
            .unwrap();
        assert_eq!(translation.field("title"), Some("Hello World"));
        assert_eq!(translation.field("body"), Some("Text"));
        assert!(engine
            .store()
            .get_translation(r, &Locale::from("fr"))
            .unwrap()
            .is_none());
    }
}
