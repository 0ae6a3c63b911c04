use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, watch};

use auction_bidding_client::live::ChannelConfig;
use auction_bidding_client::rest::RestClient;
use auction_bidding_client::session::Session;
use auction_bidding_client::view::{BiddingViewController, Exit, View};

// Terminal front-end for the bidding view: frames print to stdout and a
// line typed on stdin is submitted as a bid amount.
#[tokio::main]
async fn main() {
    env_logger::init();

    let api_base =
        std::env::var("AUCTION_API_URL").unwrap_or_else(|_| "http://localhost:8080/api".to_string());
    let ws_base =
        std::env::var("AUCTION_WS_URL").unwrap_or_else(|_| "ws://localhost:8080".to_string());

    let token = match std::env::var("AUCTION_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            eprintln!("AUCTION_TOKEN is not set; sign in and export the bearer token");
            return;
        }
    };

    let item_id: i64 = match std::env::args().nth(1).and_then(|arg| arg.parse().ok()) {
        Some(id) => id,
        None => {
            eprintln!("usage: auction-bidding-client <item-id>");
            return;
        }
    };

    let session = match Session::from_token(&token) {
        Some(session) => session,
        None => {
            eprintln!("the token is not usable; sign in again");
            return;
        }
    };

    let api = Arc::new(RestClient::new(api_base, &session));
    let controller = BiddingViewController::new(api, session, item_id);

    let (frame_tx, mut frame_rx) = mpsc::channel(16);
    let (input_tx, input_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            print_frame(&frame);
        }
    });

    let mut page = tokio::spawn(controller.run(
        ChannelConfig::new(ws_base),
        frame_tx,
        input_rx,
        shutdown_rx,
    ));

    let exit = tokio::select! {
        result = &mut page => result.unwrap_or(Exit::NavigatedAway),
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown_tx.send(true);
            page.await.unwrap_or(Exit::NavigatedAway)
        }
    };

    if exit == Exit::SignedOut {
        println!("Session expired. Sign in again.");
    }
}

fn print_frame(frame: &View) {
    match frame {
        View::Loading => println!("Loading..."),
        View::PageError(message) => println!("! {}", message),
        View::Bidding(vm) => {
            println!(
                "[{:?}] {} | {} | {} bids | leader: {} | ends in {} | live: {:?}",
                vm.status,
                vm.item_name,
                vm.price_label,
                vm.bid_count,
                vm.highest_bidder_label,
                vm.countdown_label,
                vm.live,
            );
            if let Some(error) = &vm.amount_field_error {
                println!("  amount: {}", error);
            }
            if let Some(banner) = &vm.banner {
                println!("  [{:?}] {}", banner.kind, banner.text);
            }
            if let Some(outcome) = &vm.outcome {
                println!("  outcome: {:?}", outcome);
            }
        }
    }
}
