mod config;
mod quiz;
mod render;
mod speech;
mod tutor;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use quiz::{dictionary::SharedDictionary, engine::Action};
use speech::Speech;
use teloxide::{prelude::*, utils::command::BotCommands};
use tutor::Tutor;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Команды:")]
enum Command {
    #[command(description = "познакомиться")]
    Start,
    #[command(description = "как это работает")]
    Help,
    #[command(description = "новое слово")]
    Word,
    #[command(description = "начать тест")]
    Test,
    #[command(description = "начать заново")]
    Clear,
    #[command(description = "перечитать словарь")]
    Reload,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Action::Start,
            Command::Help => Action::Help,
            Command::Word => Action::RequestWord,
            Command::Test => Action::StartTest,
            Command::Clear => Action::Clear,
            Command::Reload => Action::Reload,
        }
    }
}

#[tokio::main]
async fn main() {
    let env_file = dotenv();

    pretty_env_logger::init();
    log::info!("Starting vocabulary bot...");
    if let Err(err) = env_file {
        log::debug!("No .env loaded: {}", err);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let speech = match Speech::new(config.speech) {
        Ok(speech) => Arc::new(speech),
        Err(err) => {
            log::error!("Failed to set up speech synthesis: {}", err);
            std::process::exit(1);
        }
    };
    if !speech.is_enabled() {
        log::info!("Pronunciation audio is disabled");
    }

    log::info!("Loading the dictionary from {}", config.dictionary_path.display());
    let tutor = Arc::new(Tutor::new(SharedDictionary::open(config.dictionary_path)));

    let bot = Bot::from_env();
    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", err);
    }

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(command_handler),
            )
            .branch(dptree::endpoint(text_handler)),
    )
    .dependencies(dptree::deps![tutor, speech])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

async fn command_handler(
    bot: Bot,
    msg: Message,
    command: Command,
    tutor: Arc<Tutor>,
    speech: Arc<Speech>,
) -> HandlerResult {
    let reply = match command {
        Command::Reload => tutor.handle_blocking(msg.chat.id, Action::Reload).await?,
        command => tutor.handle(msg.chat.id, command.into()),
    };
    render::render(&bot, msg.chat.id, reply, &speech).await
}

async fn text_handler(
    bot: Bot,
    msg: Message,
    tutor: Arc<Tutor>,
    speech: Arc<Speech>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Я понимаю только текст")
            .await?;
        return Ok(());
    };

    let reply = tutor.handle_text(msg.chat.id, text);
    render::render(&bot, msg.chat.id, reply, &speech).await
}
