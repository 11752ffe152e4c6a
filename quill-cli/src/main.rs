use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use quill_client::{
    ApiClient, AssistKind, AuthFailure, Category, CategoryInput, Comment, CommentThread,
    Dashboard, Engagement, FileStorage, Identity, ImageUpload, LikeToggle, NewAccount,
    PasswordChange, Post, PostDraft, PostPage, PostQuery, PostStatus, ProfileUpdate,
    QuillClientError, SessionState, SessionStore, parse_tags,
};
use tracing::debug;

mod display;
mod logging;
mod navigator;
mod settings;

use display::{MISSING_COMMENT_DATE, MISSING_POST_DATE, format_date, format_date_time};
use logging::init_logging;
use navigator::CliNavigator;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "CLI клиент блога Quill")]
struct Cli {
    /// Адрес API, например `http://localhost:5000/api`.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход.
    Logout,
    /// Текущий пользователь.
    Whoami,
    /// Изменение профиля; не указанные поля остаются прежними.
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Путь к новому аватару.
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Смена пароля.
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Посты.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Комментарии.
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Категории.
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// AI-помощник.
    #[command(subcommand)]
    Ai(AiCommand),
    /// Панель управления: посты и статистика.
    Dashboard,
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// Список опубликованных постов.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Идентификатор категории.
        #[arg(long)]
        category: Option<String>,
    },
    /// Пост по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Популярные посты.
    Trending {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Посты автора.
    Author {
        #[arg(long)]
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Похожие посты.
    Related {
        #[arg(long)]
        id: String,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        excerpt: Option<String>,
        /// Теги через запятую.
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Изображение; можно указать несколько раз.
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Изменение поста; не указанные поля остаются прежними.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Поставить или снять лайк.
    Like {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum CommentsCommand {
    /// Комментарии к посту.
    List {
        #[arg(long)]
        post: String,
    },
    /// Комментарии пользователя.
    User {
        #[arg(long)]
        id: String,
    },
    /// Комментарий по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Новый комментарий.
    Add {
        #[arg(long)]
        post: String,
        #[arg(long)]
        content: String,
    },
    /// Изменение комментария.
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        content: String,
    },
    /// Удаление комментария.
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum CategoriesCommand {
    /// Все категории.
    List,
    /// Новая категория (администратор).
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Изменение категории (администратор).
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Удаление категории (администратор).
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum AiCommand {
    /// Подсказка по тексту.
    Assist {
        #[arg(long, value_enum)]
        kind: AssistArg,
        #[arg(long)]
        input: String,
        /// Применить подсказку к посту с этим id.
        #[arg(long)]
        post: Option<String>,
    },
    /// Идеи для постов.
    Ideas {
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        keywords: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Draft,
    Published,
}

impl From<StatusArg> for PostStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => PostStatus::Draft,
            StatusArg::Published => PostStatus::Published,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AssistArg {
    GenerateTitle,
    Improve,
    Expand,
    Continue,
    Simplify,
    GenerateExcerpt,
    SuggestTags,
}

impl From<AssistArg> for AssistKind {
    fn from(value: AssistArg) -> Self {
        match value {
            AssistArg::GenerateTitle => AssistKind::GenerateTitle,
            AssistArg::Improve => AssistKind::Improve,
            AssistArg::Expand => AssistKind::Expand,
            AssistArg::Continue => AssistKind::Continue,
            AssistArg::Simplify => AssistKind::Simplify,
            AssistArg::GenerateExcerpt => AssistKind::GenerateExcerpt,
            AssistArg::SuggestTags => AssistKind::SuggestTags,
        }
    }
}

impl Command {
    /// Путь, которому соответствует команда: от него зависит, нужен ли
    /// переход на вход при отклонённом токене.
    fn screen(&self) -> String {
        match self {
            Command::Register { .. } => "/signup".to_string(),
            Command::Login { .. } => "/login".to_string(),
            Command::Logout | Command::Whoami => "/".to_string(),
            Command::Profile { .. } | Command::Password { .. } => "/profile".to_string(),
            Command::Posts(PostsCommand::Get { id } | PostsCommand::Like { id }) => {
                format!("/post/{id}")
            }
            Command::Posts(PostsCommand::Create { .. }) => "/create".to_string(),
            Command::Posts(PostsCommand::Update { id, .. }) => format!("/edit/{id}"),
            Command::Comments(
                CommentsCommand::List { post } | CommentsCommand::Add { post, .. },
            ) => format!("/post/{post}"),
            Command::Ai(_) => "/create".to_string(),
            Command::Dashboard | Command::Categories(_) => "/dashboard".to_string(),
            Command::Posts(_) | Command::Comments(_) => "/".to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let navigator = Arc::new(CliNavigator::new(cli.command.screen()));

    let result = run(cli, navigator.clone()).await;
    if navigator.login_requested() {
        eprintln!("Требуется вход: выполните `quill login --email ... --password ...`");
    }
    if let Err(err) = result {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli, navigator: Arc<CliNavigator>) -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?.with_server(cli.server);

    init_logging(&settings.log_level)?;
    let storage = Arc::new(FileStorage::new(&settings.session_file));
    debug!(
        api_url = %settings.api_url,
        session_file = %storage.path().display(),
        "starting"
    );

    let session = SessionStore::new(storage);
    session.restore();
    let api = ApiClient::new(&settings.http_config(), session.clone(), navigator.clone())
        .map_err(map_client_error)?;

    match cli.command {
        Command::Register {
            username,
            email,
            password,
            bio,
        } => {
            let mut account = NewAccount::new(username, email, password);
            account.bio = bio;
            let identity = session
                .register(&api, &account)
                .await
                .map_err(map_client_error)?;
            print_identity("Регистрация успешна", &identity);
        }
        Command::Login { email, password } => {
            let identity = session
                .login(&api, &email, &password)
                .await
                .map_err(map_client_error)?;
            print_identity("Вход выполнен", &identity);
        }
        Command::Logout => {
            session.logout(&api).await.map_err(map_client_error)?;
            println!("Выход выполнен");
        }
        Command::Whoami => match session.snapshot() {
            SessionState::Authenticated(auth) => {
                let title = if auth.identity.is_admin() {
                    "Вы вошли как администратор"
                } else {
                    "Вы вошли"
                };
                print_identity(title, &auth.identity);
            }
            _ => println!("Вы не вошли"),
        },
        Command::Profile {
            username,
            email,
            bio,
            avatar,
        } => {
            let current = require_identity(&session)?;
            let profile_pic = avatar
                .map(|path| {
                    ImageUpload::from_path(&path)
                        .with_context(|| format!("не удалось прочитать {}", path.display()))
                })
                .transpose()?;
            let update = ProfileUpdate {
                username: username.unwrap_or(current.username),
                email: email.unwrap_or(current.email),
                bio: bio.or(current.bio).unwrap_or_default(),
                profile_pic,
            };
            let identity = api.update_profile(update).await.map_err(map_client_error)?;
            print_identity("Профиль обновлён", &identity);
        }
        Command::Password {
            current,
            new,
            confirm,
        } => {
            api.change_password(PasswordChange {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            })
            .await
            .map_err(map_client_error)?;
            println!("Пароль изменён");
        }
        Command::Posts(command) => run_posts(&api, &session, navigator, command).await?,
        Command::Comments(command) => run_comments(&api, &session, navigator, command).await?,
        Command::Categories(command) => run_categories(&api, &session, command).await?,
        Command::Ai(command) => run_ai(&api, &session, command).await?,
        Command::Dashboard => {
            let dashboard = api.dashboard().await.map_err(map_client_error)?;
            print_dashboard(&dashboard, session.is_admin());
        }
    }

    Ok(())
}

async fn run_posts(
    api: &ApiClient,
    session: &SessionStore,
    navigator: Arc<CliNavigator>,
    command: PostsCommand,
) -> Result<()> {
    match command {
        PostsCommand::List {
            page,
            limit,
            search,
            category,
        } => {
            let mut query = PostQuery::page(page);
            query.limit = limit;
            if let Some(search) = search {
                query = query.with_search(search);
            }
            if let Some(category) = category {
                query = query.with_category(category);
            }
            let page = api.list_posts(&query).await.map_err(map_client_error)?;
            print_page(&page);
        }
        PostsCommand::Get { id } => {
            let post = api.get_post(&id).await.map_err(map_client_error)?;
            print_post(&post, session.identity().as_ref());
        }
        PostsCommand::Trending { limit } => {
            let posts = api.trending_posts(limit).await.map_err(map_client_error)?;
            print_posts("Популярное", &posts);
        }
        PostsCommand::Author { id, page } => {
            let page = api
                .posts_by_author(&id, &PostQuery::page(page))
                .await
                .map_err(map_client_error)?;
            print_page(&page);
        }
        PostsCommand::Related { id } => {
            let posts = api.related_posts(&id).await.map_err(map_client_error)?;
            print_posts("Похожие посты", &posts);
        }
        PostsCommand::Create {
            title,
            content,
            category,
            excerpt,
            tags,
            status,
            images,
        } => {
            require_identity(session)?;
            let draft = PostDraft {
                title,
                content,
                category,
                excerpt,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                status: status.map(PostStatus::from),
                images: load_images(&images)?,
                existing_images: Vec::new(),
            };
            let post = api.create_post(draft).await.map_err(map_client_error)?;
            println!("Пост создан: id={}", post.id);
        }
        PostsCommand::Update {
            id,
            title,
            content,
            category,
            excerpt,
            tags,
            status,
            images,
        } => {
            let (post, mut draft) = editable_post(api, session, &id).await?;
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if excerpt.is_some() {
                draft.excerpt = excerpt;
            }
            if let Some(tags) = tags {
                draft.tags = parse_tags(&tags);
            }
            if let Some(status) = status {
                draft.status = Some(status.into());
            }
            draft.images = load_images(&images)?;

            let updated = api
                .update_post(&post.id, draft)
                .await
                .map_err(map_client_error)?;
            println!("Пост обновлён: id={}", updated.id);
        }
        PostsCommand::Delete { id } => {
            editable_post(api, session, &id).await?;
            api.delete_post(&id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        PostsCommand::Like { id } => {
            let post = api.get_post(&id).await.map_err(map_client_error)?;
            let toggle = LikeToggle::new(&post, session.clone(), navigator);
            match toggle.toggle(api).await.map_err(map_client_error)? {
                Engagement::Applied(state) if state.liked => {
                    println!("Лайк поставлен (всего: {})", state.count);
                }
                Engagement::Applied(state) => println!("Лайк снят (всего: {})", state.count),
                Engagement::LoginRequired => {
                    return Err(anyhow!("лайкать могут только вошедшие пользователи"));
                }
            }
        }
    }
    Ok(())
}

async fn run_comments(
    api: &ApiClient,
    session: &SessionStore,
    navigator: Arc<CliNavigator>,
    command: CommentsCommand,
) -> Result<()> {
    match command {
        CommentsCommand::List { post } => {
            let comments = api.comments_for_post(&post).await.map_err(map_client_error)?;
            print_comments(&comments);
        }
        CommentsCommand::User { id } => {
            let comments = api.comments_by_user(&id).await.map_err(map_client_error)?;
            print_comments(&comments);
        }
        CommentsCommand::Get { id } => {
            let comment = api.get_comment(&id).await.map_err(map_client_error)?;
            print_comments(std::slice::from_ref(&comment));
        }
        CommentsCommand::Add { post, content } => {
            let existing = api.comments_for_post(&post).await.map_err(map_client_error)?;
            let thread = CommentThread::new(post, existing, session.clone(), navigator);
            match thread.post(api, &content).await.map_err(map_client_error)? {
                Engagement::Applied(comment) => println!(
                    "Комментарий добавлен: id={} (всего: {})",
                    comment.id,
                    thread.comments().len()
                ),
                Engagement::LoginRequired => {
                    return Err(anyhow!("комментировать могут только вошедшие пользователи"));
                }
            }
        }
        CommentsCommand::Edit { id, content } => {
            let comment = api
                .update_comment(&id, &content)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий изменён: id={}", comment.id);
        }
        CommentsCommand::Delete { id } => {
            api.delete_comment(&id).await.map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
    }
    Ok(())
}

async fn run_categories(
    api: &ApiClient,
    session: &SessionStore,
    command: CategoriesCommand,
) -> Result<()> {
    match command {
        CategoriesCommand::List => {
            let categories = api.categories().await.map_err(map_client_error)?;
            print_categories(&categories);
        }
        CategoriesCommand::Create { name, description } => {
            require_admin(session)?;
            let input = CategoryInput::normalized(name, description).map_err(map_client_error)?;
            let category = api
                .create_category(&input)
                .await
                .map_err(map_client_error)?;
            println!("Категория создана: id={}", category.id);
        }
        CategoriesCommand::Update {
            id,
            name,
            description,
        } => {
            require_admin(session)?;
            let input = CategoryInput::normalized(name, description).map_err(map_client_error)?;
            let category = api
                .update_category(&id, &input)
                .await
                .map_err(map_client_error)?;
            println!("Категория изменена: id={}", category.id);
        }
        CategoriesCommand::Delete { id } => {
            require_admin(session)?;
            api.delete_category(&id).await.map_err(map_client_error)?;
            println!("Категория удалена: id={id}");
        }
    }
    Ok(())
}

async fn run_ai(api: &ApiClient, session: &SessionStore, command: AiCommand) -> Result<()> {
    match command {
        AiCommand::Assist { kind, input, post } => {
            let kind = AssistKind::from(kind);
            let suggestion = api.assist(kind, &input).await.map_err(map_client_error)?;
            println!("{suggestion}");

            if let Some(id) = post {
                let (post, mut draft) = editable_post(api, session, &id).await?;
                draft.apply_suggestion(kind, &suggestion);
                api.update_post(&post.id, draft)
                    .await
                    .map_err(map_client_error)?;
                println!("Подсказка применена к посту id={}", post.id);
            }
        }
        AiCommand::Ideas { category, keywords } => {
            let ideas = api
                .generate_ideas(&category, &keywords)
                .await
                .map_err(map_client_error)?;
            for (index, idea) in ideas.iter().enumerate() {
                println!("{}. {idea}", index + 1);
            }
        }
    }
    Ok(())
}

fn require_identity(session: &SessionStore) -> Result<Identity> {
    session.identity().ok_or_else(|| {
        map_client_error(QuillClientError::Authentication {
            kind: AuthFailure::MissingCredential,
            message: "login required".to_string(),
        })
    })
}

fn require_admin(session: &SessionStore) -> Result<()> {
    let identity = require_identity(session)?;
    if !identity.is_admin() {
        return Err(anyhow!("требуются права администратора"));
    }
    Ok(())
}

/// Загружает пост и проверяет, что текущий пользователь может его менять.
async fn editable_post(
    api: &ApiClient,
    session: &SessionStore,
    id: &str,
) -> Result<(Post, PostDraft)> {
    let identity = require_identity(session)?;
    let post = api.get_post(id).await.map_err(map_client_error)?;
    if !post.can_be_managed_by(&identity) {
        return Err(anyhow!(
            "менять пост может только автор или администратор"
        ));
    }

    let draft = PostDraft {
        title: post.title.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        category: post
            .category
            .as_ref()
            .map(|category| category.id().to_string())
            .unwrap_or_default(),
        tags: post.tags.clone(),
        status: match post.status {
            PostStatus::Other => None,
            status => Some(status),
        },
        images: Vec::new(),
        existing_images: post.images.clone(),
    };
    Ok((post, draft))
}

fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageUpload>> {
    paths
        .iter()
        .map(|path| {
            ImageUpload::from_path(path)
                .with_context(|| format!("не удалось прочитать {}", path.display()))
        })
        .collect()
}

fn map_client_error(err: QuillClientError) -> anyhow::Error {
    let message = match err {
        QuillClientError::Authentication { kind, message } => match kind {
            AuthFailure::InvalidCredentials => "неверный email или пароль".to_string(),
            AuthFailure::CredentialRejected => "сессия истекла, войдите заново".to_string(),
            AuthFailure::Denied => format!("доступ запрещён: {message}"),
            AuthFailure::Forbidden => format!("недостаточно прав: {message}"),
            AuthFailure::MissingCredential => {
                "требуется авторизация: выполните `quill login ...` или `quill register ...`"
                    .to_string()
            }
        },
        QuillClientError::Validation(message) => format!("некорректный запрос: {message}"),
        QuillClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        QuillClientError::Network(err) => format!("ошибка сети: {err}"),
        QuillClientError::Server { status, message } => {
            format!("ошибка сервера ({status}): {message}")
        }
        QuillClientError::Storage(err) => format!("ошибка хранилища сессии: {err}"),
    };
    anyhow!(message)
}

fn local(date: Option<&DateTime<Utc>>, missing: &str) -> String {
    date.map(|date| format_date(&date.with_timezone(&Local), &Local::now()))
        .unwrap_or_else(|| missing.to_string())
}

fn local_time(date: Option<&DateTime<Utc>>, missing: &str) -> String {
    date.map(|date| format_date_time(&date.with_timezone(&Local)))
        .unwrap_or_else(|| missing.to_string())
}

fn print_identity(title: &str, identity: &Identity) {
    println!("{title}");
    println!("  id: {}", identity.id);
    println!("  username: {}", identity.username);
    println!("  email: {}", identity.email);
    println!("  role: {:?}", identity.role);
    if let Some(bio) = identity.bio.as_deref().filter(|bio| !bio.is_empty()) {
        println!("  bio: {bio}");
    }
    println!("  joined: {}", local(identity.created_at.as_ref(), "unknown"));
}

fn post_line(post: &Post) -> String {
    let author = post
        .author
        .as_ref()
        .and_then(|author| author.username())
        .unwrap_or("unknown");
    format!(
        "- [{}] {} ({}, {}, likes={}, comments={}, {})",
        post.id,
        post.title,
        author,
        local(post.created_at.as_ref(), MISSING_POST_DATE),
        post.likes.len(),
        post.comment_count(),
        post.status.as_str()
    )
}

fn print_posts(title: &str, posts: &[Post]) {
    println!("{title}: {}", posts.len());
    for post in posts {
        println!("{}", post_line(post));
    }
}

fn print_page(page: &PostPage) {
    println!(
        "Постов: {} (страница {}/{}, всего {})",
        page.posts.len(),
        page.pagination.current_page,
        page.pagination.total_pages,
        page.pagination.total_posts
    );
    for post in &page.posts {
        println!("{}", post_line(post));
    }
    if page.pagination.has_next() {
        println!("Дальше: --page {}", page.pagination.current_page + 1);
    }
}

fn print_post(post: &Post, viewer: Option<&Identity>) {
    let like = post.like_state(viewer);
    println!("{}", post.title);
    println!("id: {}", post.id);
    if let Some(author) = &post.author {
        println!("author: {}", author.username().unwrap_or(author.id()));
    }
    if let Some(category) = &post.category {
        println!("category: {}", category.name().unwrap_or(category.id()));
    }
    if !post.tags.is_empty() {
        println!("tags: {}", post.tags.join(", "));
    }
    if let Some(image) = post.display_image() {
        println!("image: {image}");
    }
    println!(
        "created: {}",
        local_time(post.created_at.as_ref(), MISSING_POST_DATE)
    );
    println!(
        "likes: {}{}, comments: {}, views: {}",
        like.count,
        if like.liked { " (вы отметили)" } else { "" },
        post.comment_count(),
        post.views
    );
    if viewer.is_some_and(|viewer| post.can_be_managed_by(viewer)) {
        println!("Вы можете изменить или удалить этот пост");
    }
    println!();
    println!("{}", post.content);
}

fn print_comments(comments: &[Comment]) {
    println!("Комментариев: {}", comments.len());
    for comment in comments {
        println!("{}", comment_line(comment));
    }
}

fn comment_line(comment: &Comment) -> String {
    let author = comment
        .author
        .as_ref()
        .map(|author| author.username().unwrap_or(author.id()))
        .unwrap_or("unknown");
    format!(
        "- [{}] {} ({}): {}",
        comment.id,
        author,
        local_time(comment.created_at.as_ref(), MISSING_COMMENT_DATE),
        comment.content
    )
}

fn print_categories(categories: &[Category]) {
    println!("Категорий: {}", categories.len());
    for category in categories {
        match &category.description {
            Some(description) => println!("- [{}] {}: {description}", category.id, category.name),
            None => println!("- [{}] {}", category.id, category.name),
        }
    }
}

fn print_dashboard(dashboard: &Dashboard, admin: bool) {
    let stats = &dashboard.stats;
    println!(
        "{}",
        if admin {
            "Панель администратора"
        } else {
            "Мои посты"
        }
    );
    println!(
        "Всего: {}, опубликовано: {}, черновиков: {}, категорий: {}",
        stats.total_posts, stats.published_posts, stats.draft_posts, stats.total_categories
    );
    for post in &dashboard.posts {
        println!("{}", post_line(post));
    }
}
