mod tracks;
